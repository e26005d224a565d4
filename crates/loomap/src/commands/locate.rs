//! `locate`: device position, its address, and where the map would center.

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use loomap_core::{Dashboard, GeoState};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct LocateView {
    position: Option<String>,
    address: Option<String>,
    map_center: String,
}

fn detail(v: &LocateView) -> String {
    [
        format!("Position:   {}", v.position.as_deref().unwrap_or("unknown")),
        format!("Address:    {}", v.address.as_deref().unwrap_or("-")),
        format!("Map center: {}", v.map_center),
    ]
    .join("\n")
}

pub async fn handle(dashboard: &Dashboard, global: &GlobalOpts) -> Result<(), CliError> {
    let cancel = CancellationToken::new();
    let state = dashboard.geo().activate(&cancel).await;
    if let GeoState::Failed(ref e) = state {
        output::warn(global, &format!("No position: {e}"));
    }

    let position = state.position();
    let address = match position {
        Some(pos) if dashboard.geocoder().is_enabled() => {
            let bar = util::spinner("Looking up address...", global);
            let address = dashboard.geocoder().resolve(pos).await;
            bar.finish_and_clear();
            address
        }
        _ => None,
    };

    // Facilities only matter for the center when there is no position.
    if position.is_none() && dashboard.session().is_some() {
        if let Err(e) = dashboard.store().load().await {
            tracing::debug!(error = %e, "facility load for map center failed");
        }
    }

    let view = LocateView {
        position: position.map(|p| p.to_string()),
        address,
        map_center: dashboard.map_center().to_string(),
    };
    let out = output::render_single(&global.output, &view, detail, |v| v.map_center.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
