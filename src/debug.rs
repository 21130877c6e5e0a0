use crate::path::PathEntry;
use crate::position::Position;
#[cfg(feature = "debug")]
use serde_json::json;

#[cfg(feature = "debug")]
thread_local!(
    static DEBUG_FRAME: std::cell::RefCell<Vec<serde_json::Value>> = Default::default();
);

#[cfg(feature = "debug")]
fn pos_json(pos: Position) -> [i32; 3] {
    [pos.x, pos.y, pos.z]
}

/// Records a generated path.
#[allow(unused)]
pub fn debug_path(name: &str, id: u64, path: &[PathEntry]) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        let nodes = path
            .iter()
            .map(|entry| pos_json(entry.start))
            .chain(path.last().map(|entry| pos_json(entry.end)))
            .collect::<Vec<_>>();
        frame.borrow_mut().push(json!({
            "type": "path",
            "name": name,
            "id": id,
            "nodes": nodes,
            "length": crate::path::path_length(path),
        }))
    })
}

/// Records a fallback or abort during route generation.
#[allow(unused)]
pub fn debug_event(name: &str, id: u64, pos: Option<Position>) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        frame.borrow_mut().push(json!({
            "type": "event",
            "name": name,
            "id": id,
            "pos": pos.map(pos_json),
        }))
    })
}

#[cfg(feature = "debug")]
pub fn take_debug_frame() -> serde_json::Value {
    json!(DEBUG_FRAME.with(|frame| frame.take()))
}
