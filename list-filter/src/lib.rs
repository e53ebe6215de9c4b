use wasm_bindgen::prelude::*;
use chrono::Utc;
use serde::Serialize;
use std::fmt::Display;
use std::rc::Rc;
use web_sys::console;

pub mod catalog;
pub mod controller;
pub mod criteria;
pub mod debounce;
pub mod error;
pub mod ingest;
pub mod matcher;
pub mod page;
pub mod projector;
pub mod sorter;

pub use catalog::{Catalog, CatalogBuilder};
pub use controller::{CriteriaChange, FilterController, SubscriptionId};
pub use criteria::{CategoryFilter, FilterCriteria, SortKind};
pub use debounce::SearchDebouncer;
pub use error::{CatalogError, FilterError};
pub use ingest::{parse_entities, Ingested};
pub use page::{paginate, Page};
pub use projector::ResultProjector;
pub use utils_common::{Entity, EntityKind};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// 初始化函数 - 设置错误处理
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// 版本信息
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// 记录到浏览器控制台并转换为JS错误
fn js_error(e: impl Display) -> JsValue {
    let msg = e.to_string();
    console::log_1(&JsValue::from_str(&format!("列表筛选出错: {}", msg)));
    JsValue::from_str(&msg)
}

/// 序列化为普通JS对象 (映射转为对象而不是 `Map`)
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| js_error(FilterError::Serialize(e.to_string())))
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// 列表筛选JS接口 - 每个挂载的视图持有一个实例
#[wasm_bindgen]
pub struct ListFilterJS {
    catalog: Rc<Catalog>,
    controller: FilterController,
}

impl ListFilterJS {
    fn with_catalog(catalog: Catalog) -> Self {
        Self {
            catalog: Rc::new(catalog),
            controller: FilterController::default(),
        }
    }
}

#[wasm_bindgen]
impl ListFilterJS {
    /// 从压缩快照创建
    #[wasm_bindgen(js_name = fromCatalog)]
    pub fn from_catalog(data: &[u8]) -> Result<ListFilterJS, JsValue> {
        let catalog = Catalog::from_compressed(data).map_err(js_error)?;
        Ok(Self::with_catalog(catalog))
    }

    /// 从条目JSON数组创建，格式错误的记录被跳过
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str) -> Result<ListFilterJS, JsValue> {
        let ingested = parse_entities(json).map_err(js_error)?;
        if ingested.skipped > 0 {
            console::log_1(&JsValue::from_str(&format!(
                "已跳过 {} 条格式错误的条目",
                ingested.skipped
            )));
        }
        Ok(Self::with_catalog(Catalog::from_entities(ingested.entities)))
    }

    #[wasm_bindgen(js_name = setDebounceDelay)]
    pub fn set_debounce_delay(&mut self, delay_ms: f64) {
        self.controller.set_debounce_delay(delay_ms);
    }

    #[wasm_bindgen(js_name = setCategory)]
    pub fn set_category(&mut self, category: &str) -> bool {
        self.controller.set_category(category)
    }

    /// 选择子分类，预选该子分类关联的标签
    #[wasm_bindgen(js_name = setSubcategory)]
    pub fn set_subcategory(&mut self, name: &str) -> bool {
        let inherited = self
            .catalog
            .inherited_tags(&self.controller.criteria().category, name);
        self.controller.set_subcategory(name, inherited)
    }

    #[wasm_bindgen(js_name = toggleTag)]
    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        self.controller.toggle_tag(tag)
    }

    #[wasm_bindgen(js_name = clearSubcategory)]
    pub fn clear_subcategory(&mut self) -> bool {
        self.controller.clear_subcategory()
    }

    #[wasm_bindgen(js_name = clearAllTags)]
    pub fn clear_all_tags(&mut self) -> bool {
        self.controller.clear_all_tags()
    }

    #[wasm_bindgen(js_name = setSearchTerm)]
    pub fn set_search_term(&mut self, text: &str) -> bool {
        self.controller.set_search_term(text)
    }

    /// 键入时调用，经防抖后由 `tick` 生效
    #[wasm_bindgen(js_name = queueSearchTerm)]
    pub fn queue_search_term(&mut self, text: &str) {
        self.controller.queue_search_term(text, now_ms());
    }

    #[wasm_bindgen]
    pub fn tick(&mut self) -> bool {
        self.controller.tick(now_ms())
    }

    #[wasm_bindgen(js_name = flushSearch)]
    pub fn flush_search(&mut self) -> bool {
        self.controller.flush_search()
    }

    #[wasm_bindgen(js_name = setSort)]
    pub fn set_sort(&mut self, sort: &str) -> Result<bool, JsValue> {
        let sort: SortKind = sort.parse().map_err(js_error)?;
        Ok(self.controller.set_sort(sort))
    }

    #[wasm_bindgen(js_name = setFacet)]
    pub fn set_facet(&mut self, key: &str, value: Option<String>) -> bool {
        self.controller.set_facet(key, value)
    }

    #[wasm_bindgen(js_name = clearFilters)]
    pub fn clear_filters(&mut self) -> bool {
        self.controller.clear_filters()
    }

    #[wasm_bindgen]
    pub fn reset(&mut self) -> bool {
        self.controller.reset()
    }

    /// 当前筛选条件
    #[wasm_bindgen]
    pub fn criteria(&self) -> Result<JsValue, JsValue> {
        to_js(self.controller.criteria())
    }

    /// 是否存在可清除的细化筛选，用于启用"清除筛选"按钮
    #[wasm_bindgen(js_name = hasRefinements)]
    pub fn has_refinements(&self) -> bool {
        self.controller.criteria().has_refinements()
    }

    /// 当前条件下的一页结果
    #[wasm_bindgen]
    pub fn results(&self, page: Option<usize>, limit: Option<usize>) -> Result<JsValue, JsValue> {
        let page = self
            .controller
            .project_page(&self.catalog.entities, Utc::now(), page, limit);
        to_js(&page)
    }

    /// 当前分类下可选的标签
    #[wasm_bindgen]
    pub fn tags(&self) -> Result<JsValue, JsValue> {
        to_js(&self.catalog.tags_for(&self.controller.criteria().category))
    }

    #[wasm_bindgen]
    pub fn subcategories(&self) -> Result<JsValue, JsValue> {
        to_js(&self.catalog.subcategories_for(&self.controller.criteria().category))
    }

    #[wasm_bindgen]
    pub fn categories(&self) -> Result<JsValue, JsValue> {
        to_js(&self.catalog.categories())
    }

    /// 订阅条件变化
    ///
    /// 回调参数为 `{ criteria, results, has_refinements }`，`results` 是按新条件重新计算的
    /// 第一页。回调运行时实例仍被借用，不能在回调里再调用本实例的方法。
    #[wasm_bindgen]
    pub fn subscribe(&mut self, callback: js_sys::Function, limit: Option<usize>) -> u32 {
        let source = Rc::clone(&self.catalog);
        let id = self.controller.subscribe_results(source, limit, Utc::now, move |change| {
            // 序列化失败时 to_js 已经记录到控制台
            if let Ok(value) = to_js(change) {
                if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                    console::log_2(&JsValue::from_str("订阅回调出错:"), &e);
                }
            }
        });
        id.as_u32()
    }

    #[wasm_bindgen]
    pub fn unsubscribe(&mut self, id: u32) -> bool {
        self.controller.unsubscribe(SubscriptionId::from(id))
    }
}
