use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use odyssey_admin_protocol::{GameMap, GridPos, MapId};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::canvas::MapCanvas;
use crate::context::{Breadcrumb, MenuItem, TitleBar};
use crate::palette::TileId;
use crate::repository::{MapRepository, RepoError};

/// Quiet period before a search edit turns into a list request.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(200);

pub const EDITOR_TITLE: &str = "Map Editor";

type OpId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Load,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::List => "list maps",
            Self::Load => "load map",
            Self::Create => "create map",
            Self::Update => "update map",
            Self::Delete => "delete map",
        };
        f.write_str(s)
    }
}

/// Outcome of one applied completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    MapsListed(usize),
    MapLoaded(MapId),
    MapCreated(MapId),
    MapUpdated(MapId),
    MapDeleted(MapId),
    /// The response arrived after newer state superseded it.
    Discarded(Operation),
    Failed { op: Operation, error: RepoError },
}

/// Why `on_save` refused to send anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveBlocked {
    NoMap,
    EmptyName,
}

impl fmt::Display for SaveBlocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMap => write!(f, "no map is open"),
            Self::EmptyName => write!(f, "map name is empty"),
        }
    }
}

impl std::error::Error for SaveBlocked {}

/// What a click at a grid position would paint. Nothing writes it yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub pos: GridPos,
    pub tile: TileId,
}

enum Completion {
    Listed {
        seq: u64,
        result: Result<Vec<GameMap>, RepoError>,
    },
    Loaded {
        generation: u64,
        result: Result<GameMap, RepoError>,
    },
    Created {
        generation: u64,
        result: Result<GameMap, RepoError>,
    },
    Updated {
        generation: u64,
        doc: GameMap,
        result: Result<(), RepoError>,
    },
    Deleted {
        id: MapId,
        result: Result<(), RepoError>,
    },
    /// The task ended without a result: it panicked, or was aborted.
    Lost(Operation),
}

/// Sends the task's completion, or `Lost` if the task unwinds first.
struct Reporter {
    op: OpId,
    kind: Operation,
    tx: UnboundedSender<(OpId, Completion)>,
    sent: bool,
}

impl Reporter {
    fn send(mut self, completion: Completion) {
        self.sent = true;
        let _ = self.tx.send((self.op, completion));
    }
}

impl Drop for Reporter {
    fn drop(&mut self) {
        if !self.sent {
            let _ = self.tx.send((self.op, Completion::Lost(self.kind)));
        }
    }
}

/// Owns the editor state and turns user intents into repository calls.
///
/// Each call runs as its own task and reports back through a channel;
/// `next_event` applies one completion at a time on the caller's task. Must be
/// driven from inside a Tokio runtime.
pub struct MapEditor<R: MapRepository> {
    repo: Arc<R>,
    debounce: Duration,

    maps: Vec<GameMap>,
    search: String,
    current: Option<GameMap>,
    name: String,
    active_tile: TileId,

    // Bumped whenever a new document takes over `current`.
    generation: u64,
    list_seq: u64,
    applied_list_seq: u64,

    next_op: OpId,
    inflight: HashMap<OpId, JoinHandle<()>>,
    search_op: Option<OpId>,
    tx: UnboundedSender<(OpId, Completion)>,
    rx: UnboundedReceiver<(OpId, Completion)>,

    canvas: MapCanvas,
}

impl<R: MapRepository> MapEditor<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self::with_canvas(repo, MapCanvas::new())
    }

    pub fn with_canvas(repo: Arc<R>, canvas: MapCanvas) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            repo,
            debounce: SEARCH_DEBOUNCE,
            maps: Vec::new(),
            search: String::new(),
            current: None,
            name: String::new(),
            active_tile: 0,
            generation: 0,
            list_seq: 0,
            applied_list_seq: 0,
            next_op: 1,
            inflight: HashMap::new(),
            search_op: None,
            tx,
            rx,
            canvas,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn maps(&self) -> &[GameMap] {
        &self.maps
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn current(&self) -> Option<&GameMap> {
        self.current.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn active_tile(&self) -> TileId {
        self.active_tile
    }

    pub fn canvas(&self) -> &MapCanvas {
        &self.canvas
    }

    /// Number of repository calls (or pending debounced searches) in flight.
    pub fn pending(&self) -> usize {
        self.inflight.len()
    }

    /// Claims the title bar, mounts the canvas and schedules the first list.
    pub fn mount(&mut self, title_bar: &mut TitleBar) {
        title_bar.set_title(EDITOR_TITLE);
        title_bar.set_breadcrumbs(vec![
            Breadcrumb::link("Dashboard", "dashboard"),
            Breadcrumb::current("Maps"),
        ]);
        title_bar.set_menu_items(vec![
            MenuItem::new("New Map", "new"),
            MenuItem::new("Save", "save"),
        ]);
        self.canvas.mount();
        self.canvas.render();
        self.schedule_search();
    }

    /// Cancels everything in flight, releases the canvas and hands the title
    /// bar back.
    pub fn unmount(&mut self, title_bar: &mut TitleBar) {
        self.cancel_all();
        self.canvas.unmount();
        title_bar.reset();
    }

    pub fn on_search_change(&mut self, text: impl Into<String>) {
        self.search = text.into();
        self.schedule_search();
    }

    pub fn on_name_change(&mut self, text: impl Into<String>) {
        self.name = text.into();
    }

    /// Replaces the current map with a local, unsaved one.
    pub fn on_new_map(&mut self) -> &GameMap {
        self.generation += 1;
        let blank = GameMap::blank();
        self.name = blank.name.clone();
        self.canvas.render();
        self.current.insert(blank)
    }

    /// Creates the current map when it is unsaved, otherwise replaces it on the
    /// server with only its name changed.
    pub fn on_save(&mut self) -> Result<(), SaveBlocked> {
        let current = self.current.as_ref().ok_or(SaveBlocked::NoMap)?;
        let name = self.name.trim();
        if name.is_empty() {
            return Err(SaveBlocked::EmptyName);
        }
        let name = name.to_string();
        let update_doc = (!current.is_unsaved()).then(|| current.renamed(name.as_str()));

        self.generation += 1;
        let generation = self.generation;
        let repo = Arc::clone(&self.repo);
        match update_doc {
            None => {
                self.spawn(Operation::Create, async move {
                    let result = repo.create(&name).await;
                    Completion::Created { generation, result }
                });
            }
            Some(doc) => {
                self.spawn(Operation::Update, async move {
                    let result = repo.update(&doc).await;
                    Completion::Updated {
                        generation,
                        doc,
                        result,
                    }
                });
            }
        }
        Ok(())
    }

    pub fn on_load(&mut self, id: MapId) {
        self.generation += 1;
        let generation = self.generation;
        let repo = Arc::clone(&self.repo);
        self.spawn(Operation::Load, async move {
            let result = repo.get(id).await;
            Completion::Loaded { generation, result }
        });
    }

    pub fn on_delete(&mut self, id: MapId) {
        let repo = Arc::clone(&self.repo);
        self.spawn(Operation::Delete, async move {
            let result = repo.delete(id).await;
            Completion::Deleted { id, result }
        });
    }

    /// Only records the selection; the map itself is untouched.
    pub fn on_tile_select(&mut self, tile: TileId) {
        self.active_tile = tile;
    }

    /// Tile that painting at canvas pixel `(px, py)` would write.
    pub fn placement_at(&self, px: u32, py: u32) -> Option<Placement> {
        self.current.as_ref()?;
        let pos = self.canvas.hit_test(px, py)?;
        Some(Placement {
            pos,
            tile: self.active_tile,
        })
    }

    /// Waits for the next completion and applies it. `None` once nothing is in
    /// flight.
    pub async fn next_event(&mut self) -> Option<EditorEvent> {
        loop {
            if self.inflight.is_empty() {
                return None;
            }
            let (op, completion) = self.rx.recv().await?;
            if self.inflight.remove(&op).is_none() {
                // Cancelled after it had already finished.
                continue;
            }
            if self.search_op == Some(op) {
                self.search_op = None;
            }
            return Some(self.apply(completion));
        }
    }

    /// Applies completions until nothing is in flight.
    pub async fn settle(&mut self) -> Vec<EditorEvent> {
        let mut events = Vec::new();
        while let Some(ev) = self.next_event().await {
            events.push(ev);
        }
        events
    }

    fn apply(&mut self, completion: Completion) -> EditorEvent {
        match completion {
            Completion::Listed { seq, result } => match result {
                Ok(maps) if seq > self.applied_list_seq => {
                    self.applied_list_seq = seq;
                    self.maps = maps;
                    EditorEvent::MapsListed(self.maps.len())
                }
                Ok(_) => EditorEvent::Discarded(Operation::List),
                Err(error) => fail(Operation::List, error),
            },
            Completion::Loaded { generation, result } => match result {
                Ok(map) if generation == self.generation => {
                    let id = map.id;
                    self.replace_current(map);
                    EditorEvent::MapLoaded(id)
                }
                Ok(_) => EditorEvent::Discarded(Operation::Load),
                Err(error) => fail(Operation::Load, error),
            },
            Completion::Created { generation, result } => match result {
                Ok(saved) => {
                    // The map exists server-side either way, so the list
                    // refresh happens even when the response is stale.
                    self.refresh_list();
                    if generation != self.generation {
                        return EditorEvent::Discarded(Operation::Create);
                    }
                    let id = saved.id;
                    self.replace_current(saved);
                    EditorEvent::MapCreated(id)
                }
                Err(error) => fail(Operation::Create, error),
            },
            Completion::Updated {
                generation,
                doc,
                result,
            } => match result {
                Ok(()) => {
                    self.refresh_list();
                    if generation != self.generation {
                        return EditorEvent::Discarded(Operation::Update);
                    }
                    let id = doc.id;
                    self.current = Some(doc);
                    EditorEvent::MapUpdated(id)
                }
                Err(error) => fail(Operation::Update, error),
            },
            Completion::Deleted { id, result } => match result {
                Ok(()) => {
                    if self.current.as_ref().is_some_and(|m| m.id == id) {
                        self.generation += 1;
                        self.current = None;
                        self.name.clear();
                    }
                    self.refresh_list();
                    EditorEvent::MapDeleted(id)
                }
                Err(error) => fail(Operation::Delete, error),
            },
            Completion::Lost(op) => fail(
                op,
                RepoError::Transport("request task ended without a response".to_string()),
            ),
        }
    }

    fn replace_current(&mut self, map: GameMap) {
        self.name = map.name.clone();
        self.current = Some(map);
        self.canvas.render();
    }

    /// `search` keeps the raw text; the request carries it trimmed.
    fn query(&self) -> Option<String> {
        let q = self.search.trim();
        (!q.is_empty()).then(|| q.to_string())
    }

    /// Debounced list. A newer call cancels the pending one.
    fn schedule_search(&mut self) {
        if let Some(op) = self.search_op.take() {
            self.cancel(op);
        }
        let delay = self.debounce;
        let op = self.spawn_list(Some(delay));
        self.search_op = Some(op);
    }

    fn refresh_list(&mut self) {
        self.spawn_list(None);
    }

    fn spawn_list(&mut self, delay: Option<Duration>) -> OpId {
        self.list_seq += 1;
        let seq = self.list_seq;
        let query = self.query();
        let repo = Arc::clone(&self.repo);
        self.spawn(Operation::List, async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let result = repo.list(query.as_deref()).await;
            Completion::Listed { seq, result }
        })
    }

    fn spawn<F>(&mut self, kind: Operation, fut: F) -> OpId
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let op = self.next_op;
        self.next_op += 1;
        let reporter = Reporter {
            op,
            kind,
            tx: self.tx.clone(),
            sent: false,
        };
        let handle = tokio::spawn(async move {
            reporter.send(fut.await);
        });
        self.inflight.insert(op, handle);
        op
    }

    fn cancel(&mut self, op: OpId) {
        if let Some(handle) = self.inflight.remove(&op) {
            handle.abort();
        }
    }

    fn cancel_all(&mut self) {
        for (_, handle) in self.inflight.drain() {
            handle.abort();
        }
        self.search_op = None;
    }
}

impl<R: MapRepository> Drop for MapEditor<R> {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

fn fail(op: Operation, error: RepoError) -> EditorEvent {
    log::error!("{op} failed: {error}");
    EditorEvent::Failed { op, error }
}
