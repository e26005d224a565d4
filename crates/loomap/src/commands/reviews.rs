//! Review command handlers.

use tabled::Tabled;

use loomap_core::{Dashboard, MapEvent, Review, ReviewDraft, model::review::MAX_SCORE};

use crate::cli::{GlobalOpts, ReviewsArgs, ReviewsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ReviewRow {
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Review")]
    body: String,
    #[tabled(rename = "By")]
    author: String,
    #[tabled(rename = "Date")]
    date: String,
}

fn to_row(r: &Review, color: bool) -> ReviewRow {
    ReviewRow {
        score: output::stars(r.score, MAX_SCORE, color),
        title: r.title.clone(),
        body: r.body.clone(),
        author: r.author.clone().unwrap_or_else(|| "-".into()),
        date: r
            .created_at
            .map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d").to_string()),
    }
}

pub async fn handle(
    dashboard: &Dashboard,
    args: ReviewsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    dashboard.start().await?;

    match args.command {
        ReviewsCommand::List { toilet } => {
            let id = util::parse_facility_id(&toilet)?;
            dashboard
                .handle_map_event(MapEvent::MarkerClick(id))
                .await?;

            let state = dashboard.reviews().state();
            if let Some(message) = state.error {
                return Err(CliError::ApiError { message });
            }

            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &state.reviews,
                |r| to_row(r, color),
                |r| format!("{}\t{}", r.score, r.title),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReviewsCommand::Add {
            toilet,
            title,
            body,
            score,
        } => {
            let id = util::parse_facility_id(&toilet)?;
            let opened = dashboard
                .handle_map_event(MapEvent::MarkerClick(id))
                .await?;

            dashboard
                .reviews()
                .edit_draft(|draft| *draft = ReviewDraft::new(title, body, score));
            dashboard.submit_review(opened.ticket).await?;

            output::success(global, &format!("Review added to toilet {id}"));
            Ok(())
        }
    }
}
