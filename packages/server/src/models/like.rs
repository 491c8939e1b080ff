use serde::Serialize;

/// Result of a like toggle.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LikeToggled {
    /// Whether the target is liked after the toggle.
    pub liked: bool,
}
