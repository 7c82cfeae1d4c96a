/// Values of the reference cell, used for anything neither the file nor the command line sets.
pub struct DefaultsConfig {
    pub unit_count: usize,
    pub unit_length: f64,
    pub unit_width: f64,
    pub unit_height: f64,

    pub row_capacities: Vec<usize>,
    pub row_offsets_y: Vec<f64>,
    pub magazine_offset_x: f64,
    pub magazine_pitch: f64,
    pub z_pick: f64,
    pub z_hover: f64,

    pub units_per_layer: usize,
    pub base_x: f64,
    pub base_y: f64,
    pub tool_z_offset: f64,
    pub hover_height: f64,
    pub horizontal_yaw_deg: f64,
    pub vertical_yaw_deg: f64,

    pub linear_speed: f64,
    pub joint_speed: f64,
    pub linear_accel: f64,
    pub joint_accel: f64,
    pub precision_speed: f64,
    pub home_joints: [f64; 6],
    pub start_joints: [f64; 6],

    pub robot: String,
    pub tool: String,
    pub world_frame: String,
    pub magazine_frame: String,
    pub structure_frame: String,
    pub unit_item_template: String,

    pub world_pose: [f64; 6],
    pub magazine_pose: [f64; 6],
    pub structure_pose: [f64; 6],
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            unit_count: 15,
            unit_length: 75.0,
            unit_width: 25.5,
            unit_height: 15.0,

            row_capacities: vec![8, 7],
            row_offsets_y: vec![97.5, 172.5],
            magazine_offset_x: 72.5,
            magazine_pitch: 25.0,
            z_pick: 15.0,
            z_hover: 45.0,

            units_per_layer: 3,
            base_x: 70.0,
            base_y: 70.0,
            tool_z_offset: 0.0,
            hover_height: 30.0,
            horizontal_yaw_deg: 90.0,
            vertical_yaw_deg: 180.0,

            linear_speed: 50.0,
            joint_speed: 50.0,
            linear_accel: 50.0,
            joint_accel: 75.0,
            precision_speed: 10.0,
            home_joints: [0.0, 50.0, 50.0, 0.0, 60.0, 0.0],
            start_joints: [0.0, 0.0, 90.0, 0.0, 90.0, 0.0],

            robot: "Staubli TX2-40".to_string(),
            tool: "AROB_LWS_VakuumGreifer_14".to_string(),
            world_frame: "World".to_string(),
            magazine_frame: "MagazinFrame".to_string(),
            structure_frame: "TowerFrame".to_string(),
            unit_item_template: "Jengastuck {n}".to_string(),

            world_pose: [0.0; 6],
            magazine_pose: [250.0, -300.0, 0.0, 0.0, 0.0, 0.0],
            structure_pose: [300.0, 150.0, 0.0, 0.0, 0.0, 0.0],
        }
    }
}
