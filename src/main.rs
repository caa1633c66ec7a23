use anyhow::Context;
use macroquad::prelude::*;
use macroquad_map_editor::scene::input::Key;
use macroquad_map_editor::scene::sprite::SpriteKind;
use macroquad_map_editor::view::{cell_at, visible_cells};
use macroquad_map_editor::{Actor, Editor, EditorEvent, EditorPaths, Pixmap, TileCoord};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn window_conf() -> Conf {
    Conf {
        window_title: "Map Editor".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

const KEYS: [(KeyCode, Key); 5] = [
    (KeyCode::Left, Key::Left),
    (KeyCode::Right, Key::Right),
    (KeyCode::Up, Key::Up),
    (KeyCode::Down, Key::Down),
    (KeyCode::Space, Key::Fire),
];

/// Screen placement of the two panes.
struct Layout {
    sheet_scale: f32,
    map_origin: Vec2,
    cell: Vec2,
}

impl Layout {
    fn of(editor: &Editor) -> Self {
        let s = editor.settings();
        let sheet_w = editor.tileset().image().width.max(1) as f32;
        let zoom = s.zoom_level as f32;
        Self {
            sheet_scale: s.horizontal_offset as f32 / sheet_w,
            map_origin: vec2(s.horizontal_offset as f32 + 8.0, 0.0),
            cell: vec2(
                editor.tileset().tile_width() as f32 * zoom,
                editor.tileset().tile_height() as f32 * zoom,
            ),
        }
    }

    fn sheet_tile(&self, editor: &Editor, mouse: Vec2) -> Option<TileCoord> {
        let ts = editor.tileset();
        let size = vec2(ts.tile_width() as f32, ts.tile_height() as f32) * self.sheet_scale;
        let (x, y) = cell_at(mouse, size, ts.tile_count_x(), ts.tile_count_y())?;
        Some(TileCoord::new(x, y))
    }

    fn map_cell(&self, editor: &Editor, mouse: Vec2) -> Option<(u32, u32)> {
        let map = editor.map();
        cell_at(mouse - self.map_origin, self.cell, map.cols(), map.rows())
    }
}

fn draw_sheet(editor: &Editor, texture: &Texture2D, layout: &Layout) {
    let img = editor.tileset().image();
    let size = vec2(img.width as f32, img.height as f32) * layout.sheet_scale;
    draw_texture_ex(
        texture,
        0.0,
        0.0,
        WHITE,
        DrawTextureParams {
            dest_size: Some(size),
            ..Default::default()
        },
    );
    let ts = editor.tileset();
    for c in editor.selection() {
        let r = ts.tile_rect(c.x, c.y);
        let s = layout.sheet_scale;
        draw_rectangle_lines(r.x * s, r.y * s, r.w * s, r.h * s, 2.0, YELLOW);
    }
}

fn draw_map(editor: &Editor, texture: &Texture2D, layout: &Layout) {
    let map = editor.map();
    let view_min = -layout.map_origin;
    let view_max = vec2(screen_width(), screen_height()) - layout.map_origin;
    let range = visible_cells(view_min, view_max, layout.cell, map.cols(), map.rows());
    for layer in 0..macroquad_map_editor::MAP_LAYERS {
        for (x, y) in range.iter() {
            let Some(pixmap) = map.cell(layer, x, y).and_then(|c| c.pixmap) else {
                continue;
            };
            let dest = layout.map_origin + vec2(x as f32, y as f32) * layout.cell;
            match pixmap {
                Pixmap::Tile(c) => draw_texture_ex(
                    texture,
                    dest.x,
                    dest.y,
                    WHITE,
                    DrawTextureParams {
                        source: Some(editor.tileset().tile_rect(c.x, c.y)),
                        dest_size: Some(layout.cell),
                        ..Default::default()
                    },
                ),
                Pixmap::Placeholder(color) => {
                    draw_rectangle(dest.x, dest.y, layout.cell.x, layout.cell.y, color)
                }
            }
        }
    }
}

fn draw_scene(editor: &Editor, layout: &Layout) {
    let Some(scene) = editor.scene() else {
        return;
    };
    let o = layout.map_origin;
    for (_, actor) in scene.actors().iter() {
        let r = actor.bounds();
        match actor {
            Actor::Projectile(_) => {
                draw_circle(o.x + r.center().x, o.y + r.center().y, r.w / 2.0, WHITE)
            }
            Actor::Sprite(s) => {
                let t = s.frame_index() as f32 / s.frame_count as f32;
                let base = match s.kind {
                    SpriteKind::Explosion => ORANGE,
                    SpriteKind::Afterburn => SKYBLUE,
                };
                draw_rectangle(o.x + r.x, o.y + r.y, r.w, r.h, Color { a: 1.0 - t, ..base });
            }
        }
    }
    let p = scene.player();
    let nose = p.pos + p.forward() * 16.0;
    let side = p.forward().perp() * 10.0;
    let tail = p.pos - p.forward() * 12.0;
    draw_triangle(o + nose, o + tail + side, o + tail - side, GREEN);
}

fn handle_mouse(editor: &mut Editor, layout: &Layout, drag_from: &mut Option<TileCoord>) {
    let mouse = Vec2::from(mouse_position());
    let shift = is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift);
    let ctrl = is_key_down(KeyCode::LeftControl) || is_key_down(KeyCode::RightControl);

    if is_mouse_button_pressed(MouseButton::Left) {
        if let Some(c) = layout.sheet_tile(editor, mouse) {
            if shift {
                editor.shift_select(c.x, c.y);
            } else {
                editor.select_tile(c.x, c.y);
                *drag_from = Some(c);
            }
        }
    }
    if is_mouse_button_down(MouseButton::Left) {
        if let (Some(from), Some(to)) = (*drag_from, layout.sheet_tile(editor, mouse)) {
            if from != to {
                editor.select_tile_rect(from, to);
            }
        }
        if let Some((x, y)) = layout.map_cell(editor, mouse) {
            if ctrl {
                if let Err(e) = editor.erase_at(x, y) {
                    error!("{}", e);
                }
            } else {
                editor.paint_at(x, y);
            }
        }
    }
    if is_mouse_button_released(MouseButton::Left) {
        *drag_from = None;
    }
    if is_mouse_button_pressed(MouseButton::Right) {
        if let Some((x, y)) = layout.map_cell(editor, mouse) {
            editor.pick_from_map(x, y);
        }
    }
}

fn handle_keys(editor: &mut Editor) {
    for (code, key) in KEYS {
        if is_key_pressed(code) {
            editor.key(key, true);
        }
        if is_key_released(code) {
            editor.key(key, false);
        }
    }
    let ctrl = is_key_down(KeyCode::LeftControl) || is_key_down(KeyCode::RightControl);
    if ctrl && is_key_pressed(KeyCode::S) {
        if let Err(e) = editor.save() {
            error!("{}", e);
        }
    }
    if is_key_pressed(KeyCode::F) {
        editor.fill_ground_with_selection();
    }
    if is_key_pressed(KeyCode::Delete) {
        editor.clear_map();
    }
}

async fn run() -> anyhow::Result<()> {
    let dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let dir = dir
        .canonicalize()
        .with_context(|| format!("resolving session directory {}", dir.display()))?;
    info!("session directory {}", dir.display());

    let mut editor = Editor::open(EditorPaths::in_dir(&dir));
    let texture = Texture2D::from_image(editor.tileset().image());
    texture.set_filter(FilterMode::Nearest);
    let mut drag_from = None;
    prevent_quit();

    loop {
        let layout = Layout::of(&editor);
        handle_keys(&mut editor);
        handle_mouse(&mut editor, &layout, &mut drag_from);

        editor.advance(Duration::from_secs_f32(get_frame_time()));
        for event in editor.drain_events() {
            if let EditorEvent::TileSelected(c) = event {
                let info = editor.store().at(c.x, c.y);
                let terrains = editor.terrains().describe(info.terrain).join(", ");
                info!(
                    x = c.x,
                    y = c.y,
                    name = %info.name,
                    layer = info.layer,
                    terrains = %terrains,
                    "tile selected"
                );
            }
        }

        clear_background(DARKGRAY);
        draw_map(&editor, &texture, &layout);
        draw_scene(&editor, &layout);
        draw_rectangle(0.0, 0.0, layout.map_origin.x, screen_height(), BLACK);
        draw_sheet(&editor, &texture, &layout);

        if is_quit_requested() {
            break;
        }
        next_frame().await;
    }

    editor.shutdown().context("saving session on exit")?;
    Ok(())
}

#[macroquad::main(window_conf)]
async fn main() {
    init_tracing();
    if let Err(e) = run().await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
