use chrono::{DateTime, Duration, Utc};

use crate::database::models::Project;

/// Whether a project still shows up in listings at `now`.
///
/// Active projects always do. A completed project stays visible until
/// `remainsAccessibleForNDays` days after its completion date, inclusive.
/// A completed project without a completion date is treated as expired.
pub fn is_visible(project: &Project, now: DateTime<Utc>) -> bool {
    if !project.status.is_completed() {
        return true;
    }

    let Some(completed_at) = project.completion_date else {
        return false;
    };

    match Duration::try_days(project.scope.remains_accessible_for_n_days)
        .and_then(|window| completed_at.checked_add_signed(window))
    {
        Some(visible_until) => now <= visible_until,
        // window beyond the representable range
        None => project.scope.remains_accessible_for_n_days > 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::ProjectStatus;
    use crate::testing::sample_project;
    use chrono::TimeZone;

    fn completed_on(day0: DateTime<Utc>, days: i64) -> Project {
        let mut project = sample_project("lead-1", "client-1");
        project.scope.remains_accessible_for_n_days = days;
        project.status = ProjectStatus::Completed;
        project.completion_date = Some(day0);
        project
    }

    #[test]
    fn active_projects_are_always_visible() {
        let project = sample_project("lead-1", "client-1");
        let far_future = Utc.with_ymd_and_hms(2999, 1, 1, 0, 0, 0).unwrap();
        assert!(is_visible(&project, far_future));
    }

    #[test]
    fn window_is_measured_in_days_from_completion() {
        let day0 = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let project = completed_on(day0, 30);

        assert!(is_visible(&project, day0 + Duration::days(29)));
        assert!(is_visible(&project, day0 + Duration::days(30)));
        assert!(!is_visible(&project, day0 + Duration::days(30) + Duration::seconds(1)));
        assert!(!is_visible(&project, day0 + Duration::days(31)));
    }

    #[test]
    fn visibility_never_returns_once_lost() {
        let day0 = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let project = completed_on(day0, 7);

        let mut seen_hidden = false;
        for hour in 0..(24 * 20) {
            let visible = is_visible(&project, day0 + Duration::hours(hour));
            if seen_hidden {
                assert!(!visible, "visible again at hour {}", hour);
            }
            seen_hidden |= !visible;
        }
        assert!(seen_hidden);
    }

    #[test]
    fn completed_without_date_is_hidden() {
        let mut project = completed_on(Utc::now(), 30);
        project.completion_date = None;
        assert!(!is_visible(&project, Utc::now()));
    }

    #[test]
    fn oversized_window_does_not_panic() {
        let project = completed_on(Utc::now(), i64::MAX);
        assert!(is_visible(&project, Utc::now()));
    }
}
