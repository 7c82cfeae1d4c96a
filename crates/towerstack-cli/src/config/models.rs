use towerstack::engine::config::BuildConfig;
use towerstack::workflows::simulate::CellFrames;

pub struct AppConfig {
    pub build: BuildConfig,
    pub frames: CellFrames,
}
