//! Toilet command handlers.

use std::sync::Arc;

use tabled::Tabled;

use loomap_core::{Access, Dashboard, Facility, Gender, MapEvent};

use crate::cli::{AccessArg, AddToiletArgs, GenderArg, GlobalOpts, ToiletsArgs, ToiletsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ToiletRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Location")]
    point: String,
    #[tabled(rename = "Gender")]
    gender: String,
    #[tabled(rename = "Access")]
    access: String,
    #[tabled(rename = "Address")]
    address: String,
}

impl From<&Arc<Facility>> for ToiletRow {
    fn from(f: &Arc<Facility>) -> Self {
        Self {
            id: f.id.to_string(),
            name: f.name.clone(),
            point: if f.is_renderable() {
                f.point.clone()
            } else {
                format!("{} (invalid)", f.point)
            },
            gender: f.gender.map(|g| g.to_string()).unwrap_or_default(),
            access: f.access.map(|a| a.to_string()).unwrap_or_default(),
            address: f.address.clone().unwrap_or_default(),
        }
    }
}

fn detail(f: &Arc<Facility>, yours: bool) -> String {
    [
        format!("ID:       {}", f.id),
        format!("Name:     {}", f.name),
        format!("Location: {}", f.point),
        format!("Address:  {}", f.address.as_deref().unwrap_or("-")),
        format!(
            "Gender:   {}",
            f.gender.map_or_else(|| "-".into(), |g| g.to_string())
        ),
        format!(
            "Access:   {}",
            f.access.map_or_else(|| "-".into(), |a| a.to_string())
        ),
        format!(
            "Added by: {}",
            match (f.owner, yours) {
                (_, true) => "you".into(),
                (Some(owner), false) => format!("user {owner}"),
                (None, false) => "-".into(),
            }
        ),
    ]
    .join("\n")
}

impl From<GenderArg> for Gender {
    fn from(g: GenderArg) -> Self {
        match g {
            GenderArg::Male => Self::Male,
            GenderArg::Female => Self::Female,
        }
    }
}

impl From<AccessArg> for Access {
    fn from(a: AccessArg) -> Self {
        match a {
            AccessArg::Free => Self::Free,
            AccessArg::Paid => Self::Paid,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: ToiletsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    dashboard.start().await?;

    match args.command {
        ToiletsCommand::List { mappable } => {
            if let Some(message) = dashboard.store().error() {
                return Err(CliError::ApiError { message });
            }
            let toilets: Vec<Arc<Facility>> = if mappable {
                dashboard.store().renderable()
            } else {
                dashboard.store().snapshot().to_vec()
            };
            let out = output::render_list(
                &global.output,
                &toilets,
                |f| ToiletRow::from(f),
                |f| f.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ToiletsCommand::Show { id } => {
            let id = util::parse_facility_id(&id)?;
            let toilet = dashboard.store().get(&id).ok_or_else(|| CliError::NotFound {
                identifier: id.to_string(),
            })?;
            let yours = dashboard.can_delete(&toilet);
            let out = output::render_single(
                &global.output,
                &toilet,
                |f| detail(f, yours),
                |f| f.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ToiletsCommand::Add(args) => add(dashboard, args, global).await,

        ToiletsCommand::Delete { id } => {
            let id = util::parse_facility_id(&id)?;
            let opened = dashboard.handle_map_event(MapEvent::MarkerClick(id)).await?;
            let view = dashboard
                .modal()
                .viewing()
                .ok_or_else(|| CliError::Internal("toilet view closed unexpectedly".into()))?;

            if !dashboard.can_delete(&view.facility) {
                output::warn(global, "You did not add this toilet; the backend may refuse");
            }
            let prompt = format!("Delete toilet '{}' ({})?", view.facility.name, id);
            if !util::confirm(&prompt, global, "toilets delete")? {
                dashboard.cancel();
                return Ok(());
            }

            dashboard.delete_active(opened.ticket).await?;
            output::success(global, &format!("Deleted toilet {id}"));
            Ok(())
        }
    }
}

async fn add(
    dashboard: &Dashboard,
    args: AddToiletArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let at = util::parse_position("at", &args.at)?;
    let opened = dashboard.handle_map_event(MapEvent::Click(at)).await?;

    match (args.address.is_some(), opened.address_lookup) {
        (true, Some(lookup)) => lookup.abort(),
        (false, Some(lookup)) => {
            let bar = util::spinner("Looking up address...", global);
            if let Err(e) = lookup.await {
                tracing::warn!(error = %e, "address lookup task failed");
            }
            bar.finish_and_clear();
        }
        (_, None) => {}
    }

    dashboard.modal().edit_add(opened.ticket, |draft| {
        draft.name = args.name;
        draft.gender = args.gender.into();
        draft.access = args.access.into();
        if let Some(address) = args.address {
            draft.address = Some(address);
        }
    });

    let toilet = dashboard.submit_add(opened.ticket).await?;
    let out = output::render_single(
        &global.output,
        &toilet,
        |f| detail(f, true),
        |f| f.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    output::success(global, &format!("Added '{}'", toilet.name));
    Ok(())
}
