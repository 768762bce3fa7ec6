/// Requests from a `CallHandle` to its controller.
#[derive(Debug)]
pub enum CallCommand {
    Shutdown,
}
