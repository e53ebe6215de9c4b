//! 排序比较器。所有排序都用稳定排序，键相同的条目保持源顺序。

use chrono::{DateTime, Utc};
use std::borrow::Borrow;
use std::cmp::Ordering;
use utils_common::Entity;

use crate::criteria::SortKind;

/// 创建至今的整天数，至少为1 (当天或未来创建的条目都按1天计)
pub fn age_in_days(entity: &Entity, now: DateTime<Utc>) -> i64 {
    (now - entity.created_at).num_days().max(1)
}

/// 趋势分数 = 热度 / max(1, 天数)
pub fn trend_score(entity: &Entity, now: DateTime<Utc>) -> f64 {
    entity.popularity as f64 / age_in_days(entity, now) as f64
}

fn newest_first(a: &Entity, b: &Entity) -> Ordering {
    b.created_at.cmp(&a.created_at)
}

/// 比较两个条目
pub fn compare(kind: SortKind, a: &Entity, b: &Entity, now: DateTime<Utc>) -> Ordering {
    match kind {
        SortKind::Newest => newest_first(a, b),
        SortKind::Oldest => a.created_at.cmp(&b.created_at),
        SortKind::MostPopular => b
            .popularity
            .cmp(&a.popularity)
            .then_with(|| newest_first(a, b)),
        SortKind::Trending => trend_score(b, now)
            .total_cmp(&trend_score(a, now))
            .then_with(|| newest_first(a, b)),
    }
}

/// 原地稳定排序
pub fn sort_entities<E>(items: &mut [E], kind: SortKind, now: DateTime<Utc>)
where
    E: Borrow<Entity>,
{
    items.sort_by(|a, b| compare(kind, a.borrow(), b.borrow(), now));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{entity, ids, now};

    #[test]
    fn newest_and_oldest() {
        let mut items = vec![
            entity("a", "T", &[], 3, 0),
            entity("b", "T", &[], 1, 0),
            entity("c", "T", &[], 2, 0),
        ];
        sort_entities(&mut items, SortKind::Newest, now());
        assert_eq!(ids(&items), ["b", "c", "a"]);

        sort_entities(&mut items, SortKind::Oldest, now());
        assert_eq!(ids(&items), ["a", "c", "b"]);
    }

    #[test]
    fn most_popular_breaks_ties_by_newest() {
        let mut items = vec![
            entity("old", "T", &[], 5, 10),
            entity("top", "T", &[], 9, 50),
            entity("new", "T", &[], 1, 10),
        ];
        sort_entities(&mut items, SortKind::MostPopular, now());
        assert_eq!(ids(&items), ["top", "new", "old"]);
    }

    #[test]
    fn trending_uses_whole_days() {
        // C: 100 / 5 = 20, D: 10 / 1 = 10
        let mut items = vec![entity("D", "T", &[], 1, 10), entity("C", "T", &[], 5, 100)];
        sort_entities(&mut items, SortKind::Trending, now());
        assert_eq!(ids(&items), ["C", "D"]);
    }

    #[test]
    fn trending_ties_go_to_newest() {
        // 10 / 2 = 5, 5 / 1 = 5: 分数相同，较新的排前
        let mut items = vec![entity("older", "T", &[], 2, 10), entity("newer", "T", &[], 1, 5)];
        assert_eq!(trend_score(&items[0], now()), trend_score(&items[1], now()));

        sort_entities(&mut items, SortKind::Trending, now());
        assert_eq!(ids(&items), ["newer", "older"]);
    }

    #[test]
    fn fresh_items_count_as_one_day() {
        let today = entity("today", "T", &[], 0, 7);
        assert_eq!(age_in_days(&today, now()), 1);
        assert_eq!(trend_score(&today, now()), 7.0);

        let mut future = entity("future", "T", &[], 0, 7);
        future.created_at = now() + chrono::Duration::days(3);
        assert_eq!(age_in_days(&future, now()), 1);
    }

    #[test]
    fn equal_keys_keep_source_order() {
        // 同一时间、同一热度: 所有排序方式都应保持输入顺序
        let items: Vec<_> = ["x", "y", "z"]
            .into_iter()
            .map(|id| entity(id, "T", &[], 2, 4))
            .collect();

        for kind in SortKind::ALL {
            let mut sorted = items.clone();
            sort_entities(&mut sorted, kind, now());
            assert_eq!(ids(&sorted), ["x", "y", "z"], "{kind} should be stable");
        }
    }
}
