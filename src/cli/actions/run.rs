use super::Action;

/// Execute the action's business logic by delegating to the appropriate module
pub async fn execute(action: Action) -> anyhow::Result<()> {
    match action {
        Action::Monitor {
            watcher,
            interval,
            listen,
            port,
        } => crate::pulse::start(watcher, interval, listen, port).await,
    }
}
