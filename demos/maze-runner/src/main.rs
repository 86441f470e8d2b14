mod platform;

use std::cell::Cell;
use std::rc::Rc;

use log::{info, warn};
use tile_engine::*;

use platform::{HeadlessPlatform, KeyCue};

const MAZE: &str = include_str!("../assets/maze.json");
const MAX_FRAMES: u64 = 600;

/// Right along the top corridor until the far wall, then down the shaft.
fn script() -> Vec<KeyCue> {
    vec![
        KeyCue { frame: 0, key: "right", down: true },
        KeyCue { frame: 90, key: "right", down: false },
        KeyCue { frame: 90, key: "down", down: true },
    ]
}

fn spawn_runner(req: &SpawnRequest) -> Result<Entity, EngineError> {
    Entity::new(req.id)
        .with_tag("runner")
        .with_rect(req.rect)
        .with_mask(collider_type::DEFAULT)
        .with_physics(TopDownPhysics::from_config(&req.physics))?
        .with_brain(Brain::new())
}

fn run() -> Result<(), EngineError> {
    let mut ctx = EngineContext::new(EngineConfig::default());
    ctx.registry.register("Runner", spawn_runner);

    let map = TileMapData::from_json(MAZE)?;
    let viewport = Viewport::new(ctx.config.display_width, ctx.config.display_height);
    let mut stage = Stage::new("maze", StageOptions::from_config(&ctx.config)).with_viewport(viewport);
    stage.load_map(&map, &ctx.registry)?;

    let Some(runner) = stage.find_by_tag("runner").map(|e| e.id) else {
        warn!("maze has no runner");
        return Ok(());
    };
    stage.follow(runner, FollowAxes::default(), None, 8.0);

    let mut game = GameLoop::new(&ctx)?;
    let escaped = Rc::new(Cell::new(false));
    let flag = Rc::clone(&escaped);
    let stop = game.stop_handle();
    stage.events.subscribe(
        EventKind::ReachedExit,
        Some(EventTarget::Stage),
        Box::new(move |_: &GameEvent| {
            flag.set(true);
            stop.stop();
        }),
    )?;
    game.stage_screen(0, stage)?;
    game.state.set("escapes", PropertyValue::Int(0), false);
    game.state.on_change(
        Some("escapes"),
        Box::new(|_: &str, v: &PropertyValue| info!("escapes now {}", v.as_i64().unwrap_or_default())),
    );

    let mut platform = HeadlessPlatform::new(script(), MAX_FRAMES);
    game.play(&mut platform)?;

    let pos = game
        .get_stage(0)
        .and_then(|s| s.get(runner))
        .map(|e| e.pos())
        .unwrap_or_default();
    if escaped.get() {
        game.state.inc("escapes", 1)?;
        info!("runner escaped after {} frames at ({:.1}, {:.1})", game.frame(), pos.x, pos.y);
    } else {
        warn!(
            "runner still inside after {} frames at ({:.1}, {:.1})",
            platform.frames(),
            pos.x,
            pos.y
        );
    }
    Ok(())
}

fn main() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
