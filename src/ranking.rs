use uuid::Uuid;

use crate::models::{ParticipantMetric, RankedEntry};

// Weights mirror the portal's emphasis on sales and customer acquisition
// over the two percentage metrics. Policy values, not business-verified.
pub const SALES_WEIGHT: f64 = 0.5;
pub const CUSTOMER_WEIGHT: f64 = 15.0;
pub const COMPLETION_WEIGHT: f64 = 1.0;
pub const ATTENDANCE_WEIGHT: f64 = 1.0;

/// Weighted composite score. Only meaningful as a sort key.
pub fn score(metric: &ParticipantMetric) -> f64 {
    metric.sales_amount * SALES_WEIGHT
        + metric.customer_count as f64 * CUSTOMER_WEIGHT
        + metric.task_completion_pct * COMPLETION_WEIGHT
        + metric.attendance_pct * ATTENDANCE_WEIGHT
}

/// Build a leaderboard for the participants whose batch key the scope
/// predicate accepts.
///
/// Entries are sorted by descending score; equal scores are ordered by
/// ascending participant id so the result does not depend on input order.
/// Ranks are 1-based positions and never shared, even on exact score ties.
/// An empty input or a scope matching nothing yields an empty board.
pub fn rank<F>(metrics: &[ParticipantMetric], scope: F) -> Vec<RankedEntry>
where
    F: Fn(&str) -> bool,
{
    let mut scored: Vec<(f64, ParticipantMetric)> = metrics
        .iter()
        .filter(|m| scope(&m.batch))
        .map(|m| (score(m), m.clone()))
        .collect();

    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.1.participant_id.cmp(&b.1.participant_id))
    });

    scored
        .into_iter()
        .enumerate()
        .map(|(index, (score, metric))| RankedEntry {
            metric,
            score,
            rank: index + 1,
        })
        .collect()
}

/// Scope predicate accepting every batch, for the national board.
pub fn national_scope(_batch: &str) -> bool {
    true
}

/// Scope predicate accepting a single batch.
pub fn batch_scope(batch: &str) -> impl Fn(&str) -> bool + '_ {
    move |key| key == batch
}

/// Find one participant's row in a ranked board, for the "your ranking"
/// highlight. A participant holds independent ranks in each scope.
pub fn standing(entries: &[RankedEntry], participant_id: Uuid) -> Option<&RankedEntry> {
    entries
        .iter()
        .find(|entry| entry.metric.participant_id == participant_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(id: u128, batch: &str, sales: f64, customers: i64) -> ParticipantMetric {
        ParticipantMetric {
            participant_id: Uuid::from_u128(id),
            display_name: format!("Student {id}"),
            email: format!("student{id}@example.com"),
            batch: batch.to_string(),
            sales_amount: sales,
            customer_count: customers,
            task_completion_pct: 90.0,
            attendance_pct: 95.0,
        }
    }

    #[test]
    fn score_applies_fixed_weights() {
        let m = metric(1, "Summer 2023", 520.0, 7);
        let expected = 520.0 * 0.5 + 7.0 * 15.0 + 90.0 + 95.0;
        assert!((score(&m) - expected).abs() < 1e-9);
    }

    #[test]
    fn rank_orders_by_descending_score() {
        let metrics = vec![
            metric(1, "Summer 2023", 150.0, 3),
            metric(2, "Summer 2023", 980.0, 15),
            metric(3, "Summer 2023", 520.0, 7),
        ];
        let board = rank(&metrics, national_scope);
        let ids: Vec<Uuid> = board.iter().map(|e| e.metric.participant_id).collect();
        assert_eq!(
            ids,
            vec![Uuid::from_u128(2), Uuid::from_u128(3), Uuid::from_u128(1)]
        );
        assert!(board[0].score > board[1].score);
    }

    #[test]
    fn exact_ties_break_by_ascending_participant_id() {
        let metrics = vec![
            metric(2, "Spring 2023", 600.0, 9),
            metric(1, "Spring 2023", 600.0, 9),
        ];
        let board = rank(&metrics, national_scope);
        assert_eq!(board[0].metric.participant_id, Uuid::from_u128(1));
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[1].metric.participant_id, Uuid::from_u128(2));
        assert_eq!(board[1].rank, 2);
    }

    #[test]
    fn order_is_independent_of_input_order() {
        let a = metric(1, "Summer 2023", 600.0, 9);
        let b = metric(2, "Summer 2023", 600.0, 9);
        let c = metric(3, "Summer 2023", 840.0, 12);

        let forward = rank(&[a.clone(), b.clone(), c.clone()], national_scope);
        let reversed = rank(&[c, b, a], national_scope);
        let ids = |board: &[RankedEntry]| -> Vec<Uuid> {
            board.iter().map(|e| e.metric.participant_id).collect()
        };
        assert_eq!(ids(&forward), ids(&reversed));
    }

    #[test]
    fn ranks_are_consecutive_and_unique() {
        let metrics: Vec<ParticipantMetric> = (1..=6)
            .map(|i| metric(i, "Summer 2023", 100.0 * i as f64, i as i64))
            .collect();
        let board = rank(&metrics, national_scope);
        let ranks: Vec<usize> = board.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn scope_filter_restricts_and_reranks() {
        let metrics = vec![
            metric(1, "Summer 2023", 1200.0, 18),
            metric(2, "Spring 2023", 150.0, 3),
        ];
        let board = rank(&metrics, batch_scope("Spring 2023"));
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].metric.participant_id, Uuid::from_u128(2));
        assert_eq!(board[0].rank, 1);
    }

    #[test]
    fn batch_and_national_ranks_are_independent() {
        let metrics = vec![
            metric(1, "Summer 2023", 980.0, 15),
            metric(2, "Spring 2023", 1200.0, 18),
            metric(3, "Spring 2023", 350.0, 5),
        ];
        let national = rank(&metrics, national_scope);
        let spring = rank(&metrics, batch_scope("Spring 2023"));

        let third = Uuid::from_u128(3);
        assert_eq!(standing(&national, third).unwrap().rank, 3);
        assert_eq!(standing(&spring, third).unwrap().rank, 2);
    }

    #[test]
    fn empty_inputs_yield_empty_boards() {
        assert!(rank(&[], national_scope).is_empty());
        let metrics = vec![metric(1, "Summer 2023", 500.0, 5)];
        assert!(rank(&metrics, batch_scope("Winter 2024")).is_empty());
    }

    #[test]
    fn standing_reports_missing_participants_as_none() {
        let board = rank(&[metric(1, "Summer 2023", 500.0, 5)], national_scope);
        assert!(standing(&board, Uuid::from_u128(9)).is_none());
    }
}
