//! Selector maps for the HUB console pages.
//!
//! The console is an Ant Design SPA with ag-grid tables; selectors mix
//! role queries, text queries, and the occasional structural fallback.

/// Login page
pub mod login {
    pub const EMAIL_INPUT: &str = "#email";
    pub const PASSWORD_INPUT: &str = "#password";
    pub const LOGIN_BUTTON: &str = "role=button[name='Увійти']";
    pub const ERROR_ALERT: &str = "form .ant-alert.ant-alert-error";
    /// Validation error under a field
    pub const FIELD_VALIDATION_ERROR: &str = "form .ant-form-item-explain-error";
    /// Explanation container (the error text may live inside)
    pub const FIELD_VALIDATION_EXPLAIN: &str = "form .ant-form-item-explain";
    /// Any explain element (Ant Design v4/v5)
    pub const FIELD_VALIDATION_ANY: &str = "[class*=\"ant-form-item-explain\"]";
}

/// XML feed pages (list, edit form, feeds table)
pub mod xml_feed {
    pub const PRODUCTS_MENU: &str = "text=Товари";
    pub const IMPORT_NEW_ITEMS_LINK: &str = "role=link[name='Імпорт новинок']";
    pub const XML_TAB_LINK: &str = "role=link[name='XML']";
    pub const SUPPLIERS_SEARCH_INPUT: &str = "[placeholder*='Постачальник']";
    pub const ADD_NEW_FEED_BUTTON: &str = "role=button[name='Додати новий фід']";
    pub const SAVE_BUTTON: &str = "role=button[name='Зберегти']";
    pub const FEED_URL_INPUT: &str = "input[placeholder*='fmt']";
    pub const UPLOAD_ITEMS_CHECKBOX: &str =
        "div:has-text('Завантажити товари з xml') input[type='checkbox']";
    pub const SUCCESS_MESSAGE: &str = "text=Дані збережено!";
    pub const ERROR_ALERT: &str = ".ant-alert.ant-alert-error";
    pub const VALIDATION_ERROR_ANY: &str =
        ".ant-alert-error, .ant-message-error, .ant-form-item-explain-error";
    pub const FEEDS_TABLE: &str = ".ag-root";
    pub const FEED_ROW: &str = ".ag-row";
    pub const FEED_LINK_COLUMN_HEADER: &str = "text=Лінк фіду";
    pub const FEED_LINK_FILTER_ICON: &str =
        "div:nth-child(4) > .ag-header-cell-comp-wrapper > .ag-cell-label-container > .ag-header-icon > .ag-icon";
    pub const FILTER_INPUT: &str = "[placeholder='Фільтр']";
    /// Backend limit message for the 4th activation attempt
    pub const LIMIT_ERROR_TEXT: &str =
        "text=Неможливо підключити більше 3х фідів. Вимкніть спочатку один з фідів";
}
