//! Host process control.

use log::info;
use std::io;
use std::process::Command;

/// Restarts the Dock so it reloads the rewritten launcher store.
pub fn restart_dock() -> io::Result<()> {
    let status = Command::new("killall").arg("Dock").status()?;
    if !status.success() {
        return Err(io::Error::other(format!("killall Dock exited with {status}")));
    }
    info!("event=host_restart module=cli status=ok process=Dock");
    Ok(())
}
