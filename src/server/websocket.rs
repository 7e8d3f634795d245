/// Callbacks for an upgraded WebSocket connection
///
/// A WebSocket action's handler returns one of these instead of a
/// [`Response`](super::Response). The transport owns the socket and drives
/// the listener for the lifetime of the connection.
pub trait WebSocketListener: Send + Sync {
    fn on_open(&self) {}

    /// Handle a text frame; a returned string is sent back as a text frame.
    fn on_message(&self, text: &str) -> Option<String>;

    fn on_closing(&self, _code: u16, _reason: &str) {}
}
