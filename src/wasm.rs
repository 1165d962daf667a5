//! WebAssembly bindings
//!
//! JavaScript-friendly wrappers around [`Rules`]. Only compiled when
//! targeting wasm32.

#![cfg(target_arch = "wasm32")]

use crate::rules::Rules;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// Set panic hook for better error messages in browser
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

// Use smaller allocator for WASM
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Result type for JavaScript interop
#[wasm_bindgen]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizeResult {
    accepted: bool,
    residual_size: usize,
    error: Option<String>,
}

#[wasm_bindgen]
impl RecognizeResult {
    #[wasm_bindgen(getter)]
    pub fn accepted(&self) -> bool {
        self.accepted
    }

    /// Nodes reachable from the residual grammar
    #[wasm_bindgen(getter, js_name = residualSize)]
    pub fn residual_size(&self) -> usize {
        self.residual_size
    }

    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.error.clone()
    }
}

impl RecognizeResult {
    fn failed(error: String) -> Self {
        RecognizeResult {
            accepted: false,
            residual_size: 0,
            error: Some(error),
        }
    }
}

/// A grammar compiled once and matched against many inputs
#[wasm_bindgen]
pub struct Recognizer {
    rules: Rules,
}

#[wasm_bindgen]
impl Recognizer {
    /// Build a recognizer from grammar text
    #[wasm_bindgen(constructor)]
    pub fn new(grammar: &str) -> Result<Recognizer, JsValue> {
        #[cfg(feature = "console_error_panic_hook")]
        set_panic_hook();

        let rules = Rules::parse(grammar)
            .map_err(|e| JsValue::from_str(&format!("Grammar error: {}", e)))?;

        Ok(Recognizer { rules })
    }

    /// Match `input` against the first rule
    pub fn recognize(&mut self, input: &str) -> RecognizeResult {
        let start = self.rules.start();
        let grammar = self.rules.grammar_mut();
        let m = grammar.match_str(start, input);

        RecognizeResult {
            accepted: m.accepted,
            residual_size: grammar.reachable(m.residual).len(),
            error: None,
        }
    }

    /// Match `input` against the named rule
    #[wasm_bindgen(js_name = recognizeRule)]
    pub fn recognize_rule(&mut self, rule: &str, input: &str) -> RecognizeResult {
        match self.rules.match_rule(rule, input) {
            Ok(m) => RecognizeResult {
                accepted: m.accepted,
                residual_size: self.rules.grammar().reachable(m.residual).len(),
                error: None,
            },
            Err(e) => RecognizeResult::failed(e.to_string()),
        }
    }

    /// Get the number of rules in the grammar
    #[wasm_bindgen(js_name = ruleCount)]
    pub fn rule_count(&self) -> usize {
        self.rules.names().count()
    }
}

/// Convenience function: compile grammar and match input in one step
#[wasm_bindgen]
pub fn recognize(grammar: &str, input: &str) -> RecognizeResult {
    match Rules::parse(grammar) {
        Ok(rules) => Recognizer { rules }.recognize(input),
        Err(e) => RecognizeResult::failed(format!("Grammar error: {}", e)),
    }
}

/// Like [`recognize`], returning a plain JavaScript object
#[wasm_bindgen(js_name = recognizeJs)]
pub fn recognize_js(grammar: &str, input: &str) -> Result<JsValue, JsValue> {
    let result = recognize(grammar, input);
    serde_wasm_bindgen::to_value(&result).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    const DATES: &str = r#"date: digit, digit, "-", digit, digit. -digit: ["0"-"9"]."#;

    #[wasm_bindgen_test]
    fn test_recognizer_new() {
        let recognizer = Recognizer::new(DATES).unwrap();
        assert_eq!(recognizer.rule_count(), 2);
        assert!(Recognizer::new("date: digit").is_err());
    }

    #[wasm_bindgen_test]
    fn test_recognize() {
        let mut recognizer = Recognizer::new(DATES).unwrap();
        let result = recognizer.recognize("12-31");
        assert!(result.accepted());
        assert_eq!(result.error(), None);
        assert!(!recognizer.recognize("12-3").accepted());
    }

    #[wasm_bindgen_test]
    fn test_recognize_unknown_rule() {
        let mut recognizer = Recognizer::new(DATES).unwrap();
        assert!(recognizer.recognize_rule("digit", "7").accepted());

        let result = recognizer.recognize_rule("month", "12");
        assert!(!result.accepted());
        assert!(result.error().is_some());
    }

    #[wasm_bindgen_test]
    fn test_recognize_bad_grammar() {
        let result = recognize("date: digit", "12");
        assert!(!result.accepted());
        assert!(result.error().unwrap().starts_with("Grammar error"));

        assert!(recognize(DATES, "01-01").accepted());
    }
}
