//! 筛选控制器 - 持有当前条件，对外暴露离散的修改意图，并在条件变化时通知订阅者。
//!
//! 每个意图都是条件值上的全函数: 取出旧值、计算新值、整体替换。

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::mem;
use std::rc::Rc;
use utils_common::Entity;

use crate::criteria::{CategoryFilter, FilterCriteria, SortKind};
use crate::debounce::SearchDebouncer;
use crate::page::Page;
use crate::projector::ResultProjector;

/// 订阅句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

impl SubscriptionId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for SubscriptionId {
    fn from(value: u32) -> Self {
        SubscriptionId(value)
    }
}

/// 推送给视图的变化: 新条件加上按新条件重新计算的第一页结果
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CriteriaChange {
    pub criteria: FilterCriteria,
    pub results: Page<Entity>,
    /// 是否存在可被"清除筛选"清掉的条件
    pub has_refinements: bool,
}

type Subscriber = Box<dyn FnMut(&FilterCriteria)>;

/// 筛选控制器
pub struct FilterController {
    criteria: FilterCriteria,
    debouncer: SearchDebouncer,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u32,
}

impl Default for FilterController {
    fn default() -> Self {
        Self::new(SearchDebouncer::default())
    }
}

impl FilterController {
    pub fn new(debouncer: SearchDebouncer) -> Self {
        Self {
            criteria: FilterCriteria::default(),
            debouncer,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// 当前筛选条件
    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// 注册订阅者，条件实际变化后被调用
    pub fn subscribe(&mut self, callback: impl FnMut(&FilterCriteria) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// 注册订阅者，回调直接拿到重新计算后的结果，无需再回头查询控制器
    pub fn subscribe_results<S, N, F>(
        &mut self,
        source: Rc<S>,
        limit: Option<usize>,
        clock: N,
        mut callback: F,
    ) -> SubscriptionId
    where
        S: AsRef<[Entity]> + 'static,
        N: Fn() -> DateTime<Utc> + 'static,
        F: FnMut(&CriteriaChange) + 'static,
    {
        self.subscribe(move |criteria| {
            let results =
                ResultProjector::project_page((*source).as_ref(), criteria, clock(), None, limit);
            callback(&CriteriaChange {
                criteria: criteria.clone(),
                results,
                has_refinements: criteria.has_refinements(),
            });
        })
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn apply(&mut self, intent: &'static str, f: impl FnOnce(FilterCriteria) -> FilterCriteria) -> bool {
        let previous = mem::take(&mut self.criteria);
        let next = f(previous.clone());
        let changed = next != previous;
        self.criteria = next;

        tracing::debug!(intent, changed, "筛选条件更新");
        if changed {
            for (_, subscriber) in self.subscribers.iter_mut() {
                subscriber(&self.criteria);
            }
        }
        changed
    }

    pub fn set_category(&mut self, category: impl Into<CategoryFilter>) -> bool {
        let category = category.into();
        self.apply("set_category", |c| c.with_category(category))
    }

    pub fn set_subcategory<I, S>(&mut self, name: impl Into<String>, inherited_tags: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let tags: Vec<String> = inherited_tags.into_iter().map(Into::into).collect();
        self.apply("set_subcategory", |c| c.with_subcategory(name, tags))
    }

    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        self.apply("toggle_tag", |c| c.with_tag_toggled(tag))
    }

    pub fn clear_subcategory(&mut self) -> bool {
        self.apply("clear_subcategory", FilterCriteria::without_subcategory)
    }

    pub fn clear_all_tags(&mut self) -> bool {
        self.apply("clear_all_tags", FilterCriteria::without_tags)
    }

    /// 立即设置关键词，丢弃尚未生效的防抖输入
    pub fn set_search_term(&mut self, text: impl Into<String>) -> bool {
        self.debouncer.cancel();
        let text = text.into();
        self.apply("set_search_term", |c| c.with_search_term(text))
    }

    pub fn set_sort(&mut self, sort: SortKind) -> bool {
        self.apply("set_sort", |c| c.with_sort(sort))
    }

    pub fn set_facet(&mut self, key: impl Into<String>, value: Option<String>) -> bool {
        let key = key.into();
        self.apply("set_facet", |c| c.with_facet(key, value))
    }

    /// 清除细化筛选，保留分类和排序
    pub fn clear_filters(&mut self) -> bool {
        self.debouncer.cancel();
        self.apply("clear_filters", FilterCriteria::cleared)
    }

    /// 恢复到视图初次挂载时的状态
    pub fn reset(&mut self) -> bool {
        self.debouncer.cancel();
        self.apply("reset", |_| FilterCriteria::default())
    }

    /// 键入时调用: 关键词经过防抖后才生效
    pub fn queue_search_term(&mut self, text: impl Into<String>, now_ms: f64) {
        self.debouncer.push(text, now_ms);
    }

    /// 定时调用: 防抖到期则应用关键词，返回条件是否变化
    pub fn tick(&mut self, now_ms: f64) -> bool {
        match self.debouncer.poll(now_ms) {
            Some(text) => self.apply("debounced_search", |c| c.with_search_term(text)),
            None => false,
        }
    }

    /// 立即应用尚未生效的关键词
    pub fn flush_search(&mut self) -> bool {
        match self.debouncer.flush() {
            Some(text) => self.apply("flush_search", |c| c.with_search_term(text)),
            None => false,
        }
    }

    pub fn has_pending_search(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// 更换防抖延迟，尚未生效的输入被丢弃
    pub fn set_debounce_delay(&mut self, delay_ms: f64) {
        self.debouncer = SearchDebouncer::new(delay_ms);
    }

    /// 用当前条件投影源集合
    pub fn project<'a>(&self, entities: &'a [Entity], now: DateTime<Utc>) -> Vec<&'a Entity> {
        ResultProjector::project(entities, &self.criteria, now)
    }

    pub fn project_page(
        &self,
        entities: &[Entity],
        now: DateTime<Utc>,
        page: Option<usize>,
        limit: Option<usize>,
    ) -> Page<Entity> {
        ResultProjector::project_page(entities, &self.criteria, now, page, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{entity, ids, now};
    use std::cell::RefCell;

    fn busy_controller() -> FilterController {
        let mut ctl = FilterController::default();
        ctl.set_category("Technology");
        ctl.set_subcategory("Web", ["React"]);
        ctl.toggle_tag("Python");
        ctl.set_search_term("hooks");
        ctl.set_facet("location", Some("Remote".to_string()));
        ctl.set_sort(SortKind::MostPopular);
        ctl
    }

    #[test]
    fn set_category_always_resets_refinement_scope() {
        for prior in [FilterController::default(), busy_controller()] {
            let mut ctl = prior;
            ctl.set_category("Design");
            assert!(ctl.criteria().subcategory.is_none());
            assert!(ctl.criteria().tags.is_empty());
        }
    }

    #[test]
    fn clear_filters_restores_refinements_only() {
        let mut ctl = busy_controller();
        ctl.toggle_tag("Go");
        ctl.queue_search_term("pending", 0.0);
        ctl.clear_filters();

        let c = ctl.criteria();
        assert!(c.tags.is_empty());
        assert!(c.subcategory.is_none());
        assert_eq!(c.search_term, "");
        assert_eq!(c.category.name(), Some("Technology"));
        assert_eq!(c.sort, SortKind::MostPopular);
        assert!(!ctl.has_pending_search());
    }

    #[test]
    fn toggle_is_reversible() {
        let mut ctl = busy_controller();
        let before = ctl.criteria().clone();
        assert!(ctl.toggle_tag("Rust"));
        assert!(ctl.toggle_tag("Rust"));
        assert_eq!(ctl.criteria(), &before);
    }

    #[test]
    fn subscribers_see_only_real_changes() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut ctl = FilterController::default();
        let sink = Rc::clone(&seen);
        let id = ctl.subscribe(move |c| sink.borrow_mut().push(c.sort));

        assert!(ctl.set_sort(SortKind::Trending));
        assert!(!ctl.set_sort(SortKind::Trending));
        assert!(!ctl.clear_all_tags());
        assert_eq!(*seen.borrow(), vec![SortKind::Trending]);

        assert!(ctl.unsubscribe(id));
        assert!(!ctl.unsubscribe(id));
        ctl.set_sort(SortKind::Oldest);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn results_subscriber_receives_recomputed_page() {
        let source = Rc::new(vec![
            entity("A", "Technology", &["React"], 2, 5),
            entity("B", "Technology", &["Python"], 1, 20),
            entity("C", "Design", &["Figma"], 3, 1),
        ]);
        let seen: Rc<RefCell<Vec<CriteriaChange>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut ctl = FilterController::default();
        ctl.subscribe_results(source, Some(1), now, move |change| {
            sink.borrow_mut().push(change.clone())
        });

        ctl.set_category("Technology");
        ctl.toggle_tag("Python");

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].results.total, 2);
        assert_eq!(ids(&seen[0].results.items), ["B"]);
        assert!(!seen[0].has_refinements);

        assert_eq!(seen[1].criteria.tags.len(), 1);
        assert_eq!(ids(&seen[1].results.items), ["B"]);
        assert_eq!(seen[1].results.total, 1);
        assert!(seen[1].has_refinements);
    }

    #[test]
    fn subscription_ids_survive_the_u32_boundary() {
        let mut ctl = FilterController::default();
        let first = ctl.subscribe(|_| {});
        let second = ctl.subscribe(|_| {});
        assert_ne!(first, second);
        assert_eq!(SubscriptionId::from(second.as_u32()), second);
        assert!(ctl.unsubscribe(SubscriptionId::from(first.as_u32())));
    }

    #[test]
    fn debounced_search_applies_last_keystroke() {
        let mut ctl = FilterController::new(SearchDebouncer::new(200.0));
        ctl.queue_search_term("r", 0.0);
        ctl.queue_search_term("re", 100.0);
        assert!(!ctl.tick(250.0));
        assert_eq!(ctl.criteria().search_term, "");

        assert!(ctl.tick(300.0));
        assert_eq!(ctl.criteria().search_term, "re");
        assert!(!ctl.has_pending_search());
    }

    #[test]
    fn immediate_search_drops_stale_pending_term() {
        let mut ctl = FilterController::default();
        ctl.queue_search_term("old", 0.0);
        ctl.set_search_term("new");
        assert!(!ctl.tick(10_000.0));
        assert_eq!(ctl.criteria().search_term, "new");

        ctl.queue_search_term("enter", 0.0);
        assert!(ctl.flush_search());
        assert_eq!(ctl.criteria().search_term, "enter");
    }

    #[test]
    fn reset_returns_to_defaults() {
        let mut ctl = busy_controller();
        assert!(ctl.reset());
        assert_eq!(ctl.criteria(), &FilterCriteria::default());
    }

    #[test]
    fn project_follows_current_criteria() {
        let source = vec![
            entity("A", "Technology", &["React"], 2, 5),
            entity("B", "Technology", &["Python"], 1, 20),
            entity("C", "Design", &["Figma"], 3, 1),
        ];
        let mut ctl = FilterController::default();
        assert_eq!(ids(&ctl.project(&source, now())), ["B", "A", "C"]);

        ctl.set_category("Technology");
        ctl.toggle_tag("Python");
        assert_eq!(ids(&ctl.project(&source, now())), ["B"]);

        let page = ctl.project_page(&source, now(), None, None);
        assert_eq!(page.total, 1);
    }
}
