use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use std::time::Duration;

use hayfield::config::FarmConfig;
use hayfield::HayfieldPlugin;

const FRAME_TIME: Duration = Duration::from_millis(33);

/// Counts down `FarmConfig::session_secs`, then asks the app to quit.
#[derive(Resource)]
struct SessionTimer(Timer);

fn main() {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(FRAME_TIME)),
        LogPlugin::default(),
        StatesPlugin,
    ));

    // Loaded after LogPlugin so config messages are visible.
    let config = FarmConfig::load_from_env();
    if let Some(secs) = config.session_secs {
        app.insert_resource(SessionTimer(Timer::from_seconds(secs, TimerMode::Once)))
            .add_systems(Update, end_session);
    }

    app.insert_resource(config)
        .add_plugins(HayfieldPlugin)
        .run();
}

fn end_session(
    time: Res<Time>,
    mut timer: ResMut<SessionTimer>,
    mut exit: EventWriter<AppExit>,
) {
    if timer.0.tick(time.delta()).just_finished() {
        info!("Session over, shutting down");
        exit.send(AppExit::Success);
    }
}
