mod command;
mod config;

pub use command::{Command, HELP};
pub use config::{Cli, ConsoleConfig};

use anyhow::Context;
use odyssey_admin_engine::{
    EditorEvent, HttpMapRepository, MapEditor, MapRepository, TilePalette, TitleBar,
};
use odyssey_admin_protocol::{Direction, GameMap};
use std::io::Write;
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Runs the console against the HTTP map API until `quit` or end of input.
pub async fn run<I, W>(config: &ConsoleConfig, input: I, out: &mut W) -> anyhow::Result<()>
where
    I: AsyncBufRead + Unpin,
    W: Write,
{
    let repo = HttpMapRepository::new(&config.base_url, config.timeout())
        .with_context(|| format!("map api at {}", config.base_url))?;
    log::info!("using map api at {}", config.base_url);
    run_with(Arc::new(repo), config, input, out).await
}

/// Event loop over commands and editor completions, on the caller's task.
///
/// End of input lets in-flight requests finish; `quit` cancels them.
pub async fn run_with<R, I, W>(
    repo: Arc<R>,
    config: &ConsoleConfig,
    input: I,
    out: &mut W,
) -> anyhow::Result<()>
where
    R: MapRepository,
    I: AsyncBufRead + Unpin,
    W: Write,
{
    let mut title_bar = TitleBar::new();
    let palette = TilePalette::sample();
    let mut editor = MapEditor::new(repo).with_debounce(config.debounce());
    editor.mount(&mut title_bar);
    writeln!(out, "{}", title_bar.trail())?;

    let mut lines = input.lines();
    let mut quit = false;
    while !quit {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("read command")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(Command::Quit) => quit = true,
                    Ok(cmd) => execute(cmd, &mut editor, &palette, &title_bar, out)?,
                    Err(e) => writeln!(out, "error: {e}")?,
                }
            }
            Some(event) = editor.next_event() => report(&event, &editor, out)?,
        }
    }

    if !quit {
        for event in editor.settle().await {
            report(&event, &editor, out)?;
        }
    }
    editor.unmount(&mut title_bar);
    out.flush()?;
    Ok(())
}

fn execute<R: MapRepository, W: Write>(
    cmd: Command,
    editor: &mut MapEditor<R>,
    palette: &TilePalette,
    title_bar: &TitleBar,
    out: &mut W,
) -> anyhow::Result<()> {
    match cmd {
        Command::List => {
            if editor.maps().is_empty() {
                writeln!(out, "no maps")?;
            }
            let current = editor.current().map(|m| m.id);
            for map in editor.maps() {
                let mark = if Some(map.id) == current { '*' } else { ' ' };
                writeln!(out, "{mark} #{} {}", map.id, map.name)?;
            }
        }
        Command::Search(text) => editor.on_search_change(text),
        Command::Open(id) => editor.on_load(id),
        Command::New => {
            let map = editor.on_new_map();
            writeln!(out, "new map: {} (unsaved)", map.name)?;
        }
        Command::Name(text) => editor.on_name_change(text),
        Command::Save => {
            if let Err(blocked) = editor.on_save() {
                log::warn!("save skipped: {blocked}");
                writeln!(out, "save skipped: {blocked}")?;
            }
        }
        Command::Delete(id) => editor.on_delete(id),
        Command::Tile(id) => {
            if !palette.select(id, |t| editor.on_tile_select(t)) {
                writeln!(out, "unknown tile {id}")?;
            }
        }
        Command::Palette => writeln!(out, "{}", palette.render_line(editor.active_tile()))?,
        Command::Show => match editor.current() {
            Some(map) => describe(map, editor.name(), out)?,
            None => writeln!(out, "no map is open")?,
        },
        Command::Render(path) => {
            editor
                .canvas()
                .export_png(&path)
                .with_context(|| format!("render {}", path.display()))?;
            writeln!(out, "wrote {}", path.display())?;
        }
        Command::Menu => {
            for item in title_bar.menu_items() {
                writeln!(out, "{} ({})", item.label, item.command)?;
            }
        }
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => {}
    }
    Ok(())
}

fn describe<W: Write>(map: &GameMap, edited_name: &str, out: &mut W) -> anyhow::Result<()> {
    let id = if map.is_unsaved() {
        "unsaved".to_string()
    } else {
        format!("#{}", map.id)
    };
    writeln!(out, "{id} {edited_name}")?;
    if edited_name != map.name {
        writeln!(out, "  stored name: {}", map.name)?;
    }
    let updated = map
        .last_updated
        .format(&Rfc3339)
        .unwrap_or_else(|_| map.last_updated.to_string());
    writeln!(out, "  version {} updated {updated}", map.version)?;
    if !map.tags.is_empty() {
        writeln!(out, "  tags: {}", map.tags.join(", "))?;
    }
    if map.tiles.is_empty() {
        writeln!(out, "  tiles: none")?;
    } else {
        let dim = map.tiles.dim();
        writeln!(out, "  tiles: {dim}x{dim}")?;
    }
    for dir in Direction::ALL {
        if let Some(target) = map.links.get(dir) {
            writeln!(out, "  {dir:?} -> #{target}")?;
        }
    }
    Ok(())
}

fn report<R: MapRepository, W: Write>(
    event: &EditorEvent,
    editor: &MapEditor<R>,
    out: &mut W,
) -> anyhow::Result<()> {
    match event {
        EditorEvent::MapsListed(count) => {
            let search = editor.search().trim();
            if search.is_empty() {
                writeln!(out, "listed {count} maps")?;
            } else {
                writeln!(out, "listed {count} maps matching {search:?}")?;
            }
        }
        EditorEvent::MapLoaded(id) => writeln!(out, "loaded #{id} {}", editor.name())?,
        EditorEvent::MapCreated(id) => writeln!(out, "created #{id}")?,
        EditorEvent::MapUpdated(id) => writeln!(out, "saved #{id}")?,
        EditorEvent::MapDeleted(id) => writeln!(out, "deleted #{id}")?,
        EditorEvent::Discarded(op) => log::debug!("discarded stale {op} response"),
        EditorEvent::Failed { op, error } => writeln!(out, "{op} failed: {error}")?,
    }
    Ok(())
}
