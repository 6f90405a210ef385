//! Per-operation script builders
//!
//! Each builder wraps a locator's element expression in an IIFE that
//! resolves the element fresh and returns a primitive the caller can map
//! without further protocol round-trips. Mutating scripts report their
//! outcome as a status string ('ok' / 'absent' / 'disabled') so a node that
//! went stale between the wait and the action is distinguishable.

use crate::element::locator::Locator;

/// True when the element is attached to the DOM
pub fn exists_script(locator: &Locator) -> String {
    format!(
        "(() => {{ const el = {expr}; return !!el; }})()",
        expr = locator.element_expr()
    )
}

/// True when the element is attached, rendered, and not visibility-hidden
pub fn displayed_script(locator: &Locator) -> String {
    format!(
        "(() => {{
            const el = {expr};
            if (!el) return false;
            const style = window.getComputedStyle(el);
            return el.getClientRects().length > 0 && style.visibility !== 'hidden';
        }})()",
        expr = locator.element_expr()
    )
}

/// True when the element is displayed and accepts interaction
pub fn interactable_script(locator: &Locator) -> String {
    format!(
        "(() => {{
            const el = {expr};
            if (!el) return false;
            const style = window.getComputedStyle(el);
            return el.getClientRects().length > 0 && style.visibility !== 'hidden' && !el.disabled;
        }})()",
        expr = locator.element_expr()
    )
}

/// Click the element; returns 'ok', 'absent', or 'disabled'
pub fn click_script(locator: &Locator) -> String {
    format!(
        "(() => {{
            const el = {expr};
            if (!el) return 'absent';
            if (el.disabled) return 'disabled';
            el.click();
            return 'ok';
        }})()",
        expr = locator.element_expr()
    )
}

/// textContent of the element, or null when absent
pub fn text_script(locator: &Locator) -> String {
    format!(
        "(() => {{ const el = {expr}; return el ? el.textContent : null; }})()",
        expr = locator.element_expr()
    )
}

/// Set the element's value and fire the events a framework listens for
///
/// Returns 'ok', 'absent', or 'disabled'.
pub fn set_value_script(locator: &Locator, value: &str) -> String {
    format!(
        "(() => {{
            const el = {expr};
            if (!el) return 'absent';
            if (el.disabled || el.readOnly) return 'disabled';
            el.focus();
            el.value = {value};
            el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            return 'ok';
        }})()",
        expr = locator.element_expr(),
        value = serde_json::json!(value)
    )
}

/// One attribute of the element, JSON-wrapped, or null when the element is absent
pub fn attribute_script(locator: &Locator, name: &str) -> String {
    format!(
        "(() => {{
            const el = {expr};
            if (!el) return null;
            return JSON.stringify({{ value: el.getAttribute({name}) }});
        }})()",
        expr = locator.element_expr(),
        name = serde_json::json!(name)
    )
}

/// Resolve the element into a JSON summary, or null when absent
pub fn resolve_script(locator: &Locator) -> String {
    format!(
        "(() => {{
            const el = {expr};
            if (!el) return null;
            return JSON.stringify({{
                tag_name: el.tagName.toLowerCase(),
                text_content: el.textContent ? el.textContent.substring(0, 100) : null
            }});
        }})()",
        expr = locator.element_expr()
    )
}
