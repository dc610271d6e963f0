use anyhow::Result;
use navguard::cli::{actions, actions::Action, start};

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Start the program
    let (action, globals) = start()?;

    // Handle the action
    match action {
        Action::Check { .. } => actions::check::handle(action, &globals).await?,
    }

    Ok(())
}
