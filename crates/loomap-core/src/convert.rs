// ── API-to-domain type conversions ──
//
// Bridges raw `loomap_api` wire types into canonical `loomap_core::model`
// domain types. The backend is a Go service, so "absent" frequently
// arrives as a zero value (`0`, `""`) rather than a missing key; both are
// treated as absent here.

use tracing::warn;

use loomap_api::models as wire;

use crate::model::{Access, Facility, FacilityDraft, FacilityId, Gender, GeoPosition, Review};
use crate::model::review::MAX_SCORE;

// ── Helpers ────────────────────────────────────────────────────────

fn present_id(raw: Option<i64>) -> Option<i64> {
    raw.filter(|id| *id > 0)
}

fn present_text(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

/// Resolve a facility id, falling back to a local placeholder.
fn resolve_id(raw: Option<i64>) -> FacilityId {
    if let Some(id) = present_id(raw) {
        FacilityId::Server(id)
    } else {
        let placeholder = FacilityId::placeholder();
        warn!(%placeholder, "backend omitted facility id, using local placeholder");
        placeholder
    }
}

/// Round a backend float score into `0..=5`. Non-finite becomes 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
fn normalize_score(raw: f64) -> u8 {
    if !raw.is_finite() {
        return 0;
    }
    raw.round().clamp(0.0, f64::from(MAX_SCORE)) as u8
}

// ── Facility ────────────────────────────────────────────────────────

impl From<wire::Toilet> for Facility {
    fn from(t: wire::Toilet) -> Self {
        Facility {
            id: resolve_id(t.id),
            name: t.name.unwrap_or_default(),
            point: t.point.unwrap_or_default(),
            gender: t.gender.and_then(|g| g.parse::<Gender>().ok()),
            access: t.toilet_type.and_then(|a| a.parse::<Access>().ok()),
            address: present_text(t.address),
            owner: present_id(t.founder_id),
        }
    }
}

/// Canonical request body for a draft.
pub(crate) fn new_toilet(draft: &FacilityDraft) -> wire::NewToilet {
    wire::NewToilet {
        name: draft.name.trim().to_owned(),
        point: draft.location.to_point(),
        gender: draft.gender.to_string(),
        toilet_type: draft.access.to_string(),
        address: draft.address.clone(),
    }
}

/// Build the authoritative facility for a just-created entry.
///
/// Every field the backend echoed supersedes the draft; everything it
/// left out falls back to what the user submitted. The owner falls back
/// to the current session's subject. A point is only taken from the
/// backend if it parses, so the result always has a usable location.
pub(crate) fn overlay_created(
    draft: &FacilityDraft,
    created: wire::Toilet,
    subject: Option<i64>,
) -> Facility {
    let point = created
        .point
        .filter(|p| p.parse::<GeoPosition>().is_ok())
        .unwrap_or_else(|| draft.location.to_point());

    Facility {
        id: resolve_id(created.id),
        name: present_text(created.name).unwrap_or_else(|| draft.name.trim().to_owned()),
        point,
        gender: Some(
            created
                .gender
                .and_then(|g| g.parse().ok())
                .unwrap_or(draft.gender),
        ),
        access: Some(
            created
                .toilet_type
                .and_then(|a| a.parse().ok())
                .unwrap_or(draft.access),
        ),
        address: present_text(created.address).or_else(|| draft.address.clone()),
        owner: present_id(created.founder_id).or(subject),
    }
}

// ── Review ──────────────────────────────────────────────────────────

impl From<wire::Review> for Review {
    fn from(r: wire::Review) -> Self {
        Review {
            title: r.title,
            body: r.review_text,
            score: normalize_score(r.score),
            facility_id: present_id(r.toilet_id),
            created_at: r.created_at,
            author: present_text(r.username),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn draft() -> FacilityDraft {
        FacilityDraft {
            name: "Central".into(),
            location: GeoPosition::new(10.0, 20.0),
            gender: Gender::Female,
            access: Access::Paid,
            address: Some("1 Main St".into()),
        }
    }

    #[test]
    fn overlay_keeps_draft_point_when_backend_omits_it() {
        let created = wire::Toilet {
            id: Some(42),
            founder_id: Some(7),
            ..wire::Toilet::default()
        };
        let facility = overlay_created(&draft(), created, Some(99));

        assert_eq!(
            facility,
            Facility {
                id: FacilityId::Server(42),
                name: "Central".into(),
                point: "10,20".into(),
                gender: Some(Gender::Female),
                access: Some(Access::Paid),
                address: Some("1 Main St".into()),
                owner: Some(7),
            }
        );
    }

    #[test]
    fn overlay_prefers_backend_fields() {
        let created = wire::Toilet {
            id: Some(5),
            name: Some("Central Station".into()),
            point: Some("10.5,20.25".into()),
            ..wire::Toilet::default()
        };
        let facility = overlay_created(&draft(), created, Some(3));

        assert_eq!(facility.name, "Central Station");
        assert_eq!(facility.point, "10.5,20.25");
        assert_eq!(facility.owner, Some(3));
    }

    #[test]
    fn overlay_ignores_unparseable_backend_point() {
        let created = wire::Toilet {
            id: Some(5),
            point: Some("garbage".into()),
            ..wire::Toilet::default()
        };
        let facility = overlay_created(&draft(), created, None);
        assert_eq!(facility.point, "10,20");
    }

    #[test]
    fn overlay_without_id_gets_placeholder() {
        let facility = overlay_created(&draft(), wire::Toilet::default(), None);
        assert!(facility.id.is_placeholder());
        assert!(facility.is_renderable());
    }

    #[test]
    fn go_zero_values_are_absent() {
        let facility = Facility::from(wire::Toilet {
            id: Some(3),
            founder_id: Some(0),
            address: Some(String::new()),
            point: Some("1,2".into()),
            ..wire::Toilet::default()
        });
        assert_eq!(facility.owner, None);
        assert_eq!(facility.address, None);
    }

    #[test]
    fn review_scores_are_rounded_and_clamped() {
        let mk = |score| wire::Review {
            score,
            ..wire::Review::default()
        };
        assert_eq!(Review::from(mk(3.6)).score, 4);
        assert_eq!(Review::from(mk(9.0)).score, 5);
        assert_eq!(Review::from(mk(-2.0)).score, 0);
        assert_eq!(Review::from(mk(f64::NAN)).score, 0);
    }

    #[test]
    fn new_toilet_uses_wire_values() {
        let body = new_toilet(&draft());
        assert_eq!(body.point, "10,20");
        assert_eq!(body.gender, "female");
        assert_eq!(body.toilet_type, "paid");
    }
}
