use crate::config::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::engines::generation::genome::Genome;
use crate::error::{CarEvolverError, Result};
use crate::types::CarDesc;
use serde::{Deserialize, Serialize};

/// The tunable design parameters the search can optimize. Each one can be
/// enabled or disabled independently; a genome only carries values for the
/// enabled ones, in ascending identifier order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum GeneId {
    // The chassis points (the triangle car uses point 0, the box car uses both)
    Chassis0X = 0,
    Chassis0Y = 1,
    Chassis0Radius = 2, // Only used by the triangle car
    Chassis1X = 3,
    Chassis1Y = 4,

    // Location and radius of the two wheels
    Wheel0X = 5,
    Wheel0Y = 6,
    Wheel0Radius = 7,
    Wheel1X = 8,
    Wheel1Y = 9,
    Wheel1Radius = 10,

    AngularImpulsePower = 11, // Only used by the matching engine type
    JointMotorTorque = 12,    // Only used by the matching engine type
    SpringFreq = 13,          // Only used by the matching car type
    SpringDampingRatio = 14,  // Only used by the matching car type

    ChassisDensity = 15,
    WheelDensity = 16,
    WheelFriction = 17,
    Gravity = 18,
}

pub const NUM_GENE_IDS: u32 = 19;

/// Where an interpreted gene value lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneBinding {
    /// Written into a field of the car description.
    Design,
    /// Configures the simulated world instead of the car. The caller has to
    /// fetch these separately and apply them to the simulator.
    World,
}

impl GeneId {
    pub const ALL: [GeneId; NUM_GENE_IDS as usize] = [
        GeneId::Chassis0X,
        GeneId::Chassis0Y,
        GeneId::Chassis0Radius,
        GeneId::Chassis1X,
        GeneId::Chassis1Y,
        GeneId::Wheel0X,
        GeneId::Wheel0Y,
        GeneId::Wheel0Radius,
        GeneId::Wheel1X,
        GeneId::Wheel1Y,
        GeneId::Wheel1Radius,
        GeneId::AngularImpulsePower,
        GeneId::JointMotorTorque,
        GeneId::SpringFreq,
        GeneId::SpringDampingRatio,
        GeneId::ChassisDensity,
        GeneId::WheelDensity,
        GeneId::WheelFriction,
        GeneId::Gravity,
    ];

    /// New out-of-band genes get a `World` arm here; `interpret_genome`
    /// never needs to change.
    pub fn binding(self) -> GeneBinding {
        match self {
            GeneId::Gravity => GeneBinding::World,
            _ => GeneBinding::Design,
        }
    }
}

/// Converts gene values into practical values for the simulation, such as
/// where to place a wheel or how large its radius should be.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneInterpreter {
    /// Bit-wise mask of which genes are enabled. 1=enabled, 0=disabled.
    pub gene_mask: u32,

    /// Shared quantization granularity: a gene value cannot exceed the size
    /// of the fitness texture.
    pub resolution: u32,

    pub min_wheel_friction: f32,
    pub max_wheel_friction: f32,

    pub min_wheel_radius: f32,
    pub max_wheel_radius: f32,

    pub min_chassis_radius: f32,
    pub max_chassis_radius: f32,

    pub min_chassis_x: f32,
    pub max_chassis_x: f32,

    pub min_chassis_y: f32,
    pub max_chassis_y: f32,

    pub min_wheel_x: f32,
    pub max_wheel_x: f32,

    pub min_wheel_y: f32,
    pub max_wheel_y: f32,

    pub min_chassis_density: f32,
    pub max_chassis_density: f32,

    pub min_wheel_density: f32,
    pub max_wheel_density: f32,

    pub min_joint_motor_torque: f32,
    pub max_joint_motor_torque: f32,

    pub min_angular_impulse: f32,
    pub max_angular_impulse: f32,

    pub min_spring_freq: f32,
    pub max_spring_freq: f32,

    pub min_spring_damping_ratio: f32,
    pub max_spring_damping_ratio: f32,

    pub min_gravity: f32,
    pub max_gravity: f32,
}

impl Default for GeneInterpreter {
    fn default() -> Self {
        Self {
            gene_mask: 0,
            resolution: 128,
            min_wheel_friction: 0.0,
            max_wheel_friction: 20.0,
            min_wheel_radius: 0.4,
            max_wheel_radius: 1.8,
            min_chassis_radius: 0.4,
            max_chassis_radius: 1.7,
            min_chassis_x: 0.0,
            max_chassis_x: 6.0,
            min_chassis_y: 0.0,
            max_chassis_y: 4.0,
            min_wheel_x: 0.0,
            max_wheel_x: 6.0,
            min_wheel_y: 0.0,
            max_wheel_y: 4.0,
            min_chassis_density: 0.0,
            max_chassis_density: 5.0,
            min_wheel_density: 0.0,
            max_wheel_density: 5.0,
            min_joint_motor_torque: 0.0,
            max_joint_motor_torque: 200.0,
            min_angular_impulse: 0.0,
            max_angular_impulse: 40.0,
            min_spring_freq: 2.0,
            max_spring_freq: 8.0,
            min_spring_damping_ratio: 0.4,
            max_spring_damping_ratio: 1.5,
            min_gravity: 8.0,
            max_gravity: 800.0,
        }
    }
}

impl GeneInterpreter {
    /// Configured real-valued bounds for a gene. The simulation's vertical
    /// axis is inverted relative to the texture's row axis, so min and max
    /// come back swapped for the Y position genes. Callers must not assume
    /// min <= max.
    pub fn get_range(&self, id: GeneId) -> (f32, f32) {
        match id {
            GeneId::Chassis0X | GeneId::Chassis1X => (self.min_chassis_x, self.max_chassis_x),
            GeneId::Chassis0Y | GeneId::Chassis1Y => (self.max_chassis_y, self.min_chassis_y),
            GeneId::Chassis0Radius => (self.min_chassis_radius, self.max_chassis_radius),
            GeneId::Wheel0X | GeneId::Wheel1X => (self.min_wheel_x, self.max_wheel_x),
            GeneId::Wheel0Y | GeneId::Wheel1Y => (self.max_wheel_y, self.min_wheel_y),
            GeneId::Wheel0Radius | GeneId::Wheel1Radius => {
                (self.min_wheel_radius, self.max_wheel_radius)
            }
            GeneId::AngularImpulsePower => (self.min_angular_impulse, self.max_angular_impulse),
            GeneId::JointMotorTorque => (self.min_joint_motor_torque, self.max_joint_motor_torque),
            GeneId::SpringFreq => (self.min_spring_freq, self.max_spring_freq),
            GeneId::SpringDampingRatio => {
                (self.min_spring_damping_ratio, self.max_spring_damping_ratio)
            }
            GeneId::ChassisDensity => (self.min_chassis_density, self.max_chassis_density),
            GeneId::WheelDensity => (self.min_wheel_density, self.max_wheel_density),
            GeneId::WheelFriction => (self.min_wheel_friction, self.max_wheel_friction),
            GeneId::Gravity => (self.min_gravity, self.max_gravity),
        }
    }

    pub fn num_enabled(&self) -> usize {
        GeneId::ALL.iter().filter(|id| self.enabled(**id)).count()
    }

    pub fn enabled(&self, id: GeneId) -> bool {
        (self.gene_mask & (1u32 << id as u32)) != 0
    }

    pub fn set_enabled(&mut self, id: GeneId, enabled: bool) {
        // Any genome or fitness texture built under the old mask is invalid
        // after this and must be rebuilt.
        if enabled {
            self.gene_mask |= 1u32 << id as u32;
        } else {
            self.gene_mask &= !(1u32 << id as u32);
        }
    }

    /// Converts a gene value (a texture coordinate) to a practical value
    /// usable by the simulation. A resolution of 1 or less collapses the
    /// whole range to its minimum.
    pub fn interpret_gene(&self, gene_value: u16, id: GeneId) -> f32 {
        let (min, max) = self.get_range(id);
        if self.resolution <= 1 {
            return min;
        }
        let normalized = gene_value as f32 / (self.resolution - 1) as f32;
        (max - min) * normalized + min
    }

    /// Builds a car description from a genome. Disabled genes keep their
    /// value from `default_car`; world-bound genes (gravity) are skipped
    /// here and have to be fetched through [`GeneInterpreter::world_gravity`].
    pub fn interpret_genome(&self, genome: &Genome, default_car: &CarDesc) -> Result<CarDesc> {
        let num_enabled = self.num_enabled();
        if genome.values.len() != num_enabled {
            return Err(CarEvolverError::GenomeMismatch {
                expected: num_enabled,
                actual: genome.values.len(),
            });
        }

        let mut out = default_car.clone();
        let mut gene_index = 0;
        for id in GeneId::ALL {
            if !self.enabled(id) {
                continue;
            }
            let practical = self.interpret_gene(genome.values[gene_index], id);
            if id.binding() == GeneBinding::Design {
                apply_to_design(&mut out, id, practical);
            }
            gene_index += 1;
        }
        Ok(out)
    }

    /// Gravity for the simulated world: the interpreted gravity gene when it
    /// is enabled, `default_gravity` otherwise.
    pub fn world_gravity(&self, genome: &Genome, default_gravity: f32) -> Result<f32> {
        if !self.enabled(GeneId::Gravity) {
            return Ok(default_gravity);
        }
        let index = self.gene_index(GeneId::Gravity)?;
        let value = *genome.values.get(index).ok_or(CarEvolverError::GenomeMismatch {
            expected: self.num_enabled(),
            actual: genome.values.len(),
        })?;
        Ok(self.interpret_gene(value, GeneId::Gravity))
    }

    /// Which slot of the genome the given gene occupies. Counts enabled
    /// genes only, in ascending identifier order, so flipping any enable
    /// bit renumbers all following slots.
    pub fn gene_index(&self, id: GeneId) -> Result<usize> {
        let mut gene_index = 0;
        for candidate in GeneId::ALL {
            if !self.enabled(candidate) {
                continue;
            }
            if candidate == id {
                return Ok(gene_index);
            }
            gene_index += 1;
        }
        Err(CarEvolverError::InvalidGene(format!(
            "gene {id:?} has no genome slot because it is not enabled"
        )))
    }

    pub fn gene_id(&self, index: usize) -> Result<GeneId> {
        let mut gene_index = 0;
        for candidate in GeneId::ALL {
            if !self.enabled(candidate) {
                continue;
            }
            if gene_index == index {
                return Ok(candidate);
            }
            gene_index += 1;
        }
        Err(CarEvolverError::InvalidGene(format!(
            "genome slot {index} is out of bounds ({} genes enabled)",
            gene_index
        )))
    }
}

fn apply_to_design(out: &mut CarDesc, id: GeneId, value: f32) {
    match id {
        GeneId::Chassis0X => out.chassis0_pos.x = value,
        GeneId::Chassis0Y => out.chassis0_pos.y = value,
        GeneId::Chassis0Radius => out.chassis0_radius = value,
        GeneId::Chassis1X => out.chassis1_pos.x = value,
        GeneId::Chassis1Y => out.chassis1_pos.y = value,
        GeneId::Wheel0X => out.wheel0_pos.x = value,
        GeneId::Wheel0Y => out.wheel0_pos.y = value,
        GeneId::Wheel0Radius => out.wheel0_radius = value,
        GeneId::Wheel1X => out.wheel1_pos.x = value,
        GeneId::Wheel1Y => out.wheel1_pos.y = value,
        GeneId::Wheel1Radius => out.wheel1_radius = value,
        GeneId::AngularImpulsePower => out.angular_impulse = value,
        GeneId::JointMotorTorque => out.joint_motor_torque = value,
        GeneId::SpringFreq => out.spring_freq = value,
        GeneId::SpringDampingRatio => out.spring_damping_ratio = value,
        GeneId::ChassisDensity => out.chassis_density = value,
        GeneId::WheelDensity => out.wheel_density = value,
        GeneId::WheelFriction => out.wheel_friction = value,
        // World-bound genes never reach this function.
        GeneId::Gravity => {}
    }
}

impl ConfigSection for GeneInterpreter {
    fn section_name() -> &'static str {
        "interpreter"
    }

    fn validate(&self) -> Result<()> {
        if self.resolution > 65536 {
            return Err(CarEvolverError::Configuration(
                "Texture resolution cannot exceed 65536".to_string(),
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Interpreter".to_string(),
            fields: vec![
                FieldManifest {
                    name: "gene_mask".to_string(),
                    field_type: "integer".to_string(),
                    default: serde_json::json!(0),
                    min: Some(0.0),
                    max: Some(((1u64 << NUM_GENE_IDS) - 1) as f64),
                    description: "Bitmask of enabled genes".to_string(),
                },
                FieldManifest {
                    name: "resolution".to_string(),
                    field_type: "integer".to_string(),
                    default: serde_json::json!(128),
                    min: Some(0.0),
                    max: Some(1024.0),
                    description: "Quantization steps per gene (fitness texture size)"
                        .to_string(),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpreter_with(ids: &[GeneId], resolution: u32) -> GeneInterpreter {
        let mut interp = GeneInterpreter {
            resolution,
            ..GeneInterpreter::default()
        };
        for id in ids {
            interp.set_enabled(*id, true);
        }
        interp
    }

    #[test]
    fn gene_endpoints_map_to_configured_bounds() {
        let interp = interpreter_with(&[], 128);

        assert_eq!(interp.interpret_gene(0, GeneId::WheelFriction), 0.0);
        assert_eq!(interp.interpret_gene(127, GeneId::WheelFriction), 20.0);

        // Y position genes come back swapped: texture row 0 is the top.
        assert_eq!(interp.interpret_gene(0, GeneId::Wheel0Y), 4.0);
        assert_eq!(interp.interpret_gene(127, GeneId::Wheel0Y), 0.0);
    }

    #[test]
    fn degenerate_resolution_collapses_to_min() {
        let interp = interpreter_with(&[], 1);
        assert_eq!(interp.interpret_gene(0, GeneId::WheelFriction), 0.0);
        assert_eq!(interp.interpret_gene(55, GeneId::WheelFriction), 0.0);
        assert_eq!(interp.interpret_gene(55, GeneId::Wheel0Y), 4.0);
    }

    #[test]
    fn gene_index_counts_enabled_genes_only() {
        let interp = interpreter_with(
            &[GeneId::Wheel0Radius, GeneId::Wheel1Radius, GeneId::Gravity],
            128,
        );
        assert_eq!(interp.num_enabled(), 3);
        assert_eq!(interp.gene_index(GeneId::Wheel0Radius).unwrap(), 0);
        assert_eq!(interp.gene_index(GeneId::Wheel1Radius).unwrap(), 1);
        assert_eq!(interp.gene_index(GeneId::Gravity).unwrap(), 2);
        assert!(interp.gene_index(GeneId::Wheel0X).is_err());

        for i in 0..interp.num_enabled() {
            let id = interp.gene_id(i).unwrap();
            assert_eq!(interp.gene_index(id).unwrap(), i);
        }
        assert!(interp.gene_id(3).is_err());
    }

    #[test]
    fn renumbering_after_mask_change() {
        let mut interp = interpreter_with(&[GeneId::Wheel0X, GeneId::Wheel1X], 128);
        assert_eq!(interp.gene_index(GeneId::Wheel1X).unwrap(), 1);

        interp.set_enabled(GeneId::Chassis0X, true);
        assert_eq!(interp.gene_index(GeneId::Chassis0X).unwrap(), 0);
        assert_eq!(interp.gene_index(GeneId::Wheel1X).unwrap(), 2);
    }

    #[test]
    fn interpret_genome_writes_enabled_design_fields_only() {
        let interp = interpreter_with(&[GeneId::Wheel0Radius, GeneId::WheelFriction], 128);
        let genome = Genome {
            values: vec![127, 0],
            fitness: 0,
        };
        let default_car = CarDesc::default();

        let car = interp.interpret_genome(&genome, &default_car).unwrap();
        assert!((car.wheel0_radius - 1.8).abs() < 1e-5);
        assert_eq!(car.wheel_friction, 0.0);
        // Untouched by any enabled gene.
        assert_eq!(car.wheel1_radius, default_car.wheel1_radius);
    }

    #[test]
    fn interpret_genome_rejects_wrong_length() {
        let interp = interpreter_with(&[GeneId::Wheel0Radius], 128);
        let genome = Genome {
            values: vec![1, 2],
            fitness: 0,
        };
        assert!(interp.interpret_genome(&genome, &CarDesc::default()).is_err());
    }

    #[test]
    fn gravity_gene_is_world_bound() {
        let interp = interpreter_with(&[GeneId::Gravity], 128);
        let genome = Genome {
            values: vec![127],
            fitness: 0,
        };

        // The design is untouched by the gravity gene.
        let car = interp.interpret_genome(&genome, &CarDesc::default()).unwrap();
        assert_eq!(car, CarDesc::default());

        assert_eq!(interp.world_gravity(&genome, 80.0).unwrap(), 800.0);

        let disabled = interpreter_with(&[GeneId::Wheel0X], 128);
        let genome = Genome {
            values: vec![5],
            fitness: 0,
        };
        assert_eq!(disabled.world_gravity(&genome, 80.0).unwrap(), 80.0);
    }
}
