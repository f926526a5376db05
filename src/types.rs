use serde::{Deserialize, Serialize};

/// A 2D point in simulation space (meters).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Body plan of the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CarType {
    /// 2 wheels + 1 chassis circle connected with joints.
    TriangleJoint,
    /// Solid polygon chassis shaped by the wheel and chassis points.
    FixtureBox,
}

/// How the wheels are powered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineType {
    /// Applies an angular impulse to the wheels each step. Simple and fast.
    AngularImpulse,
    /// Drives the wheels through a joint motor with bounded torque.
    /// Too much torque flips the car backwards.
    JointMotor,
}

/// Real-valued design description of one vehicle, the phenotype a genome
/// interprets into. Disabled genes leave these defaults untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarDesc {
    pub car_type: CarType,
    pub engine_type: EngineType,
    pub is_invincible: bool,
    pub chassis0_pos: Vec2,
    pub chassis0_radius: f32,
    pub chassis1_pos: Vec2,
    pub wheel0_pos: Vec2,
    pub wheel0_radius: f32,
    pub wheel1_pos: Vec2,
    pub wheel1_radius: f32,
    pub joint_motor_torque: f32,
    pub target_motor_speed: f32,
    pub angular_impulse: f32,
    pub wheel_friction: f32,
    pub chassis_density: f32,
    pub wheel_density: f32,
    pub spring_freq: f32,
    pub spring_damping_ratio: f32,
}

impl Default for CarDesc {
    fn default() -> Self {
        Self {
            car_type: CarType::TriangleJoint,
            engine_type: EngineType::AngularImpulse,
            is_invincible: false,
            chassis0_pos: Vec2::new(2.0, 1.6),
            chassis0_radius: 0.7,
            chassis1_pos: Vec2::new(4.0, 2.0),
            wheel0_pos: Vec2::new(0.0, 0.0),
            wheel0_radius: 0.8,
            wheel1_pos: Vec2::new(6.0, 0.0),
            wheel1_radius: 0.8,
            joint_motor_torque: 86.0,
            target_motor_speed: 1000.0,
            angular_impulse: 20.0,
            wheel_friction: 20.0,
            chassis_density: 1.0,
            wheel_density: 1.0,
            spring_freq: 4.0,
            spring_damping_ratio: 0.7,
        }
    }
}

/// Shape family of the procedurally generated terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerrainKind {
    Normal,
    Big,
    Flat,
    Waves,
}

/// Parameters handed to the external terrain generator when a trial begins.
/// The search cycles `seed` when hunting for a well-suited terrain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainDesc {
    pub seed: u32,
    pub kind: TerrainKind,
    /// Number of chunks the terrain consists of (the length of the track).
    pub num_chunks: u32,
    pub friction: f32,
    pub min_chunk_width: f32,
    pub max_chunk_width: f32,
    pub min_chunk_height: f32,
    pub max_chunk_height: f32,
    /// The first bit of terrain is flat so the car has somewhere to spawn.
    pub first_chunk_width: f32,
    pub first_chunk_height: f32,
    pub scale: f32,
}

impl Default for TerrainDesc {
    fn default() -> Self {
        Self {
            seed: 1,
            kind: TerrainKind::Normal,
            num_chunks: 200,
            friction: 1.0,
            min_chunk_width: 40.0,
            max_chunk_width: 60.0,
            min_chunk_height: -40.0,
            max_chunk_height: 40.0,
            first_chunk_width: 256.0,
            first_chunk_height: 0.0,
            scale: 11.0,
        }
    }
}
