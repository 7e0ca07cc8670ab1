//! Four-function calculator state machine.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "×",
            Operator::Divide => "÷",
        }
    }

    pub fn apply(&self, first: f64, second: f64) -> f64 {
        match self {
            Operator::Add => first + second,
            Operator::Subtract => first - second,
            Operator::Multiply => first * second,
            Operator::Divide => first / second,
        }
    }
}

/// Render a result the way the display shows numbers.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "Error".to_string();
    }
    if value == value.trunc() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let text = format!("{:.10}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Calculator {
    display: String,
    first_operand: Option<f64>,
    operator: Option<Operator>,
    waiting_for_second: bool,
}

impl Default for Calculator {
    fn default() -> Self {
        Calculator {
            display: "0".to_string(),
            first_operand: None,
            operator: None,
            waiting_for_second: false,
        }
    }
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    /// Label of the clear key: "AC" with nothing pending, "C" otherwise.
    pub fn clear_label(&self) -> &'static str {
        if self.first_operand.is_none() {
            "AC"
        } else {
            "C"
        }
    }

    fn value(&self) -> f64 {
        self.display.parse().unwrap_or(0.0)
    }

    fn is_error(&self) -> bool {
        self.display == "Error"
    }

    pub fn input_digit(&mut self, digit: char) {
        if !digit.is_ascii_digit() {
            return;
        }
        if self.waiting_for_second || self.is_error() {
            self.display = digit.to_string();
            self.waiting_for_second = false;
        } else if self.display == "0" {
            self.display = digit.to_string();
        } else {
            self.display.push(digit);
        }
    }

    pub fn input_decimal(&mut self) {
        if self.waiting_for_second || self.is_error() {
            self.display = "0.".to_string();
            self.waiting_for_second = false;
        } else if !self.display.contains('.') {
            self.display.push('.');
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn toggle_sign(&mut self) {
        if !self.is_error() {
            self.display = format_number(-self.value());
        }
    }

    pub fn percent(&mut self) {
        if !self.is_error() {
            self.display = format_number(self.value() / 100.0);
        }
    }

    pub fn input_operator(&mut self, next: Operator) {
        if self.is_error() {
            return;
        }
        let input = self.value();
        match (self.first_operand, self.operator) {
            (None, _) => self.first_operand = Some(input),
            (Some(first), Some(op)) if !self.waiting_for_second => {
                let result = op.apply(first, input);
                self.display = format_number(result);
                self.first_operand = Some(result);
            }
            _ => {}
        }
        self.waiting_for_second = true;
        self.operator = Some(next);
    }

    pub fn equals(&mut self) {
        let (Some(first), Some(op)) = (self.first_operand, self.operator) else {
            return;
        };
        let result = op.apply(first, self.value());
        self.display = format_number(result);
        self.first_operand = if result.is_finite() { Some(result) } else { None };
        self.operator = None;
        self.waiting_for_second = false;
    }
}
