/// Entry point and demo loop: one player body walking and jumping in a
/// tile grid, drawn in the terminal. Clicking a cell edge toggles it.

mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use tilegrid::config::{BodyConfig, DemoConfig};
use tilegrid::domain::body::{Body, BodyId};
use tilegrid::domain::grid::{Grid, DEFAULT_RESOLUTION};
use tilegrid::sim::event::ContactEvent;
use tilegrid::sim::level::{load_level_file, LevelDef};
use ui::input::InputState;
use ui::renderer::{edge_at, Renderer};

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = DemoConfig::load();
    let level = config.grid.level.as_deref().and_then(|path| match load_level_file(path) {
        Ok(def) => Some(def),
        Err(e) => {
            log::error!("{e}; falling back to the default arena");
            None
        }
    });

    let (mut grid, world) = build_world(&config, level.as_ref());
    let (x, y) = world.spawn;
    let player = grid.add(
        Body::new(config.body.width, config.body.height, x, y)
            .with_mass(config.body.mass),
    );
    log::info!(
        "{}: {}x{} tiles, resolution {}, gravity {}",
        world.name, grid.width(), grid.height(), grid.resolution(), grid.gravity(),
    );

    let mut renderer = Renderer::new();
    let enhanced_keys = match renderer.init() {
        Ok(enhanced) => enhanced,
        Err(e) => {
            eprintln!("Terminal init failed: {e}");
            return;
        }
    };

    let result = demo_loop(&mut grid, player, &mut renderer, enhanced_keys, &config, &world);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Demo error: {e}");
        std::process::exit(1);
    }
}

/// Player spawn (left, bottom) and the display name.
struct World {
    spawn: (f32, f32),
    name: String,
}

fn build_world(config: &DemoConfig, level: Option<&LevelDef>) -> (Grid, World) {
    let res = config.grid.resolution;

    if let Some(def) = level {
        let grid = def.build_grid(config.grid.gravity, res);
        let spawn = def.spawn_position(res).unwrap_or_else(|| grid.arena_spawn());
        return (grid, World { spawn, name: def.name.clone() });
    }

    let grid = if res == DEFAULT_RESOLUTION {
        Grid::new(config.grid.width, config.grid.height, config.grid.gravity)
    } else {
        let mut grid = Grid::blank(config.grid.width, config.grid.height, config.grid.gravity, res);
        grid.paint_arena();
        grid.paint_demo_platforms();
        grid
    };
    let spawn = grid.arena_spawn();
    (grid, World { spawn, name: "Boxed Arena".to_string() })
}

fn demo_loop(
    grid: &mut Grid,
    player: BodyId,
    renderer: &mut Renderer,
    enhanced_keys: bool,
    config: &DemoConfig,
    world: &World,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = enhanced_keys;
    let tick_rate = Duration::from_millis(config.tick_rate_ms);
    let timestep = config.timestep();
    let mut last_tick = Instant::now();
    let mut pending_jump = false;
    let mut events: Vec<ContactEvent> = Vec::new();

    loop {
        kb.drain_events()?;

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) {
            break;
        }
        // Jump is edge-triggered; keep it until the next tick consumes it.
        if kb.any_pressed(KEYS_JUMP) {
            pending_jump = true;
        }
        if kb.any_pressed(KEYS_RESPAWN) {
            if let Some(body) = grid.body_mut(player) {
                body.set_position(world.spawn.0, world.spawn.1);
                body.set_vx(0.0);
                body.set_vy(0.0);
            }
        }
        for &(column, row) in kb.clicks() {
            if let Some(edge) = edge_at(grid, column, row) {
                grid.toggle_edge(edge);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            if let Some(body) = grid.body_mut(player) {
                apply_input(body, &kb, std::mem::take(&mut pending_jump), &config.body);
            }

            events.clear();
            grid.update_with_events(timestep, &mut events);
            for event in &events {
                log::trace!("{event:?}");
            }

            last_tick = Instant::now();
        }

        let selected = kb.pointer().and_then(|(column, row)| edge_at(grid, column, row));
        renderer.render(grid, grid.body(player), selected, &world.name)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_JUMP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W'), KeyCode::Char(' ')];
const KEYS_RESPAWN: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

fn apply_input(body: &mut Body, kb: &InputState, jump: bool, cfg: &BodyConfig) {
    let left = kb.any_held(KEYS_LEFT);
    let right = kb.any_held(KEYS_RIGHT);
    let vx = match (left, right) {
        (true, false) => -cfg.walk_speed,
        (false, true) => cfg.walk_speed,
        _ => 0.0,
    };
    body.set_vx(vx);

    if jump && body.is_on_ground() {
        body.set_vy(cfg.jump_speed);
    }
}
