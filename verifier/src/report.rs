/// One structural expectation against the loaded page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Check {
    /// Printed as `<label> exists: <bool>`.
    Exists {
        label: &'static str,
        selector: &'static str,
    },
    /// Printed as `<label> count: <n>`.
    Count {
        label: &'static str,
        selector: &'static str,
    },
}

impl Check {
    pub fn selector(&self) -> &'static str {
        match *self {
            Check::Exists { selector, .. } | Check::Count { selector, .. } => selector,
        }
    }

    pub fn label(&self) -> &'static str {
        match *self {
            Check::Exists { label, .. } | Check::Count { label, .. } => label,
        }
    }
}

pub const PAGE_CHECKS: &[Check] = &[
    Check::Exists {
        label: "Header",
        selector: ".header",
    },
    Check::Exists {
        label: "Hero section",
        selector: ".hero",
    },
    Check::Exists {
        label: "Skills section",
        selector: ".skills",
    },
    Check::Exists {
        label: "Projects section",
        selector: ".projects",
    },
    Check::Exists {
        label: "Credentials section",
        selector: ".credentials",
    },
    Check::Exists {
        label: "Contact section",
        selector: ".contact",
    },
    Check::Exists {
        label: "Footer",
        selector: ".footer",
    },
    Check::Count {
        label: "Skill items",
        selector: ".skill-item",
    },
    Check::Count {
        label: "Project cards",
        selector: ".project-card",
    },
    Check::Count {
        label: "Certificate items",
        selector: ".cert-item",
    },
    Check::Count {
        label: "Form inputs",
        selector: ".form-input",
    },
];

#[derive(Clone, Debug, PartialEq)]
pub struct CheckResult {
    pub check: Check,
    pub matched: usize,
}

impl CheckResult {
    pub fn passed(&self) -> bool {
        self.matched > 0
    }

    pub fn line(&self) -> String {
        match self.check {
            Check::Exists { label, .. } => format!("{} exists: {}", label, self.passed()),
            Check::Count { label, .. } => format!("{} count: {}", label, self.matched),
        }
    }
}

/// Printed as soon as the page has loaded, before any check runs.
pub fn loaded_lines(title: &str) -> [String; 2] {
    [
        "Portfolio page loaded successfully!".to_string(),
        format!("Page title: {}", title),
    ]
}

#[derive(Clone, Debug, Default)]
pub struct Report {
    pub results: Vec<CheckResult>,
    pub console_errors: Vec<String>,
    pub strict: bool,
}

impl Report {
    fn missing(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| !r.passed())
    }

    pub fn succeeded(&self) -> bool {
        self.console_errors.is_empty() && !(self.strict && self.missing().next().is_some())
    }

    pub fn lines(&self) -> Vec<String> {
        let mut out: Vec<String> = self.results.iter().map(CheckResult::line).collect();

        if self.console_errors.is_empty() {
            out.push(String::new());
            out.push("No console errors detected!".to_string());
        } else {
            out.push(String::new());
            out.push("--- Console Errors ---".to_string());
            out.extend(self.console_errors.iter().map(|e| format!("ERROR: {}", e)));
        }

        if self.strict {
            let missing: Vec<_> = self.missing().collect();
            if !missing.is_empty() {
                out.push(String::new());
                out.push("--- Missing Elements ---".to_string());
                out.extend(missing.iter().map(|r| {
                    format!("MISSING: {} ({})", r.check.label(), r.check.selector())
                }));
            }
        }

        if self.succeeded() {
            out.push(String::new());
            out.push("=== All tests passed! ===".to_string());
        }
        out
    }
}
