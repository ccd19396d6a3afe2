use odyssey_admin_engine::TileId;
use odyssey_admin_protocol::MapId;
use std::path::PathBuf;
use std::str::FromStr;

pub const HELP: &str = "\
commands:
  list              show the last map list
  search [text]     filter maps by name (empty clears)
  open <id>         load a map
  new               start a new, unsaved map
  name <text>       edit the map name
  save              create or update the current map
  delete <id>       delete a map
  tile <id>         pick the active palette tile
  palette           show the palette
  show              describe the current map
  render <file>     write the canvas to a PNG file
  menu              show title bar menu items
  help              this text
  quit              leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Search(String),
    Open(MapId),
    New,
    Name(String),
    Save,
    Delete(MapId),
    Tile(TileId),
    Palette,
    Show,
    Render(PathBuf),
    Menu,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_start();
        let (word, rest) = match line.split_once(' ') {
            Some((w, r)) => (w, r),
            None => (line.trim_end(), ""),
        };
        let cmd = match word {
            "list" | "ls" => Self::List,
            // Search and name keep their text verbatim; trimming is the
            // editor's call.
            "search" => Self::Search(rest.to_string()),
            "name" => Self::Name(rest.to_string()),
            "open" => Self::Open(parse_id(word, rest)?),
            "delete" => Self::Delete(parse_id(word, rest)?),
            "tile" => Self::Tile(parse_id(word, rest)?),
            "new" => Self::New,
            "save" => Self::Save,
            "palette" => Self::Palette,
            "show" => Self::Show,
            "render" => {
                let path = rest.trim();
                if path.is_empty() {
                    return Err("render needs a file path".to_string());
                }
                Self::Render(PathBuf::from(path))
            }
            "menu" => Self::Menu,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("unknown command: {other}")),
        };
        Ok(cmd)
    }
}

fn parse_id(word: &str, rest: &str) -> Result<u32, String> {
    rest.trim()
        .parse()
        .map_err(|_| format!("{word} needs a numeric id, got {:?}", rest.trim()))
}
