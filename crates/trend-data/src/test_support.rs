//! Synthetic diff reports for unit tests.

use trend_core::models::ParsedReport;

use crate::parser::parse_report;

/// Builder for a report laid out the way the diff tool prints it.
#[derive(Debug, Clone)]
pub(crate) struct ReportFixture {
    old: String,
    new: String,
    codes: Option<(i64, i64)>,
    totals: (f64, f64),
    methods: (i64, i64),
    include_dex: bool,
}

impl ReportFixture {
    pub(crate) fn new(old: &str, new: &str) -> Self {
        Self {
            old: old.to_string(),
            new: new.to_string(),
            codes: None,
            totals: (5.8, 5.9),
            methods: (21_474, 21_481),
            include_dex: true,
        }
    }

    pub(crate) fn codes(mut self, old: i64, new: i64) -> Self {
        self.codes = Some((old, new));
        self
    }

    pub(crate) fn totals(mut self, old: f64, new: f64) -> Self {
        self.totals = (old, new);
        self
    }

    pub(crate) fn methods(mut self, old: i64, new: i64) -> Self {
        self.methods = (old, new);
        self
    }

    pub(crate) fn without_dex(mut self) -> Self {
        self.include_dex = false;
        self
    }

    pub(crate) fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Diffuse Comparison: {} → {}\n", self.old, self.new));
        out.push_str(&"=".repeat(80));
        out.push_str("\n\n");
        out.push_str(&format!("OLD: app-{}.apk (signature: V2)\n", self.old));
        out.push_str(&format!("NEW: app-{}.apk (signature: V2)\n\n", self.new));

        out.push_str("          │          compressed           │          uncompressed\n");
        out.push_str("          ├───────────┬───────────┬───────┼───────────┬───────────┬─────────\n");
        out.push_str(" APK      │ old       │ new       │ diff  │ old       │ new       │ diff\n");
        out.push_str("──────────┼───────────┼───────────┼───────┼───────────┼───────────┼─────────\n");
        out.push_str("      dex │   3.2 MiB │   3.2 MiB │ +912 B │   7.9 MiB │   7.9 MiB │ +1.9 KiB\n");
        out.push_str("     arsc │   469 KiB │   470 KiB │ +1 KiB │   469 KiB │   470 KiB │ +1 KiB\n");
        out.push_str(" manifest │   2.1 KiB │   2.1 KiB │    0 B │   8.4 KiB │   8.4 KiB │    0 B\n");
        out.push_str("      res │   1.9 MiB │   1.9 MiB │  +12 B │   2.2 MiB │   2.2 MiB │  +12 B\n");
        out.push_str("    other │   300 KiB │   300 KiB │    0 B │   610 KiB │   610 KiB │    0 B\n");
        out.push_str("──────────┼───────────┼───────────┼───────┼───────────┼───────────┼─────────\n");
        out.push_str(&format!(
            "    total │   {:.1} MiB │   {:.1} MiB │ +21.3 KiB │  11.8 MiB │  12.0 MiB │ +42 KiB\n\n",
            self.totals.0, self.totals.1
        ));

        if self.include_dex {
            out.push_str(" DEX     │ old    │ new    │ diff\n");
            out.push_str("─────────┼────────┼────────┼────────────────\n");
            out.push_str("   files │      1 │      1 │   0\n");
            out.push_str(" strings │ 15,957 │ 15,958 │  +1 (+4 -3)\n");
            out.push_str("   types │  3,210 │  3,211 │  +1 (+1 -0)\n");
            out.push_str(" classes │  2,801 │  2,802 │  +1 (+1 -0)\n");
            out.push_str(&format!(
                " methods │ {} │ {} │  +7 (+123 -116)\n",
                self.methods.0, self.methods.1
            ));
            out.push_str("  fields │ 11,020 │ 11,024 │  +4 (+5 -1)\n");
            out.push_str(" lambdas │     40 │     41 │  +1 (+1 -0)\n\n");
        }

        out.push_str(" ARSC    │ old │ new │ diff\n");
        out.push_str("─────────┼─────┼─────┼──────────────\n");
        out.push_str(" configs │ 108 │ 108 │   0\n");
        out.push_str(" entries │ 333 │ 347 │ +14 (+14 -0)\n");
        out.push_str(" density │  12 │  12 │   0\n\n");

        if let Some((old_code, new_code)) = self.codes {
            out.push_str("              │ old      │ new      │ diff\n");
            out.push_str("──────────────┼──────────┼──────────┼──────\n");
            out.push_str(&format!(
                " version code │ {:<8} │ {:<8} │ +{}\n",
                old_code,
                new_code,
                new_code - old_code
            ));
            out.push_str(&format!(
                " version name │ {:<8} │ {:<8} │\n\n",
                self.old, self.new
            ));
        }

        out.push_str("=================\n====   APK   ====\n=================\n\n");
        out.push_str("   compressed   │  uncompressed   │\n");
        out.push_str(" size   │ diff  │ size   │ diff   │ path\n");
        out.push_str("────────┼───────┼────────┼────────┼──────────────\n");
        out.push_str(" 3.2 MiB │ +912 B │ 7.9 MiB │ +1.9 KiB │ ∆ classes.dex\n\n");
        if self.include_dex {
            out.push_str("=================\n====   DEX   ====\n=================\n\n");
            out.push_str("METHODS:\n\n   old   │ new   │ diff\n");
            out.push_str("  ───────┼───────┼─────────────\n");
            out.push_str("   21474 │ 21481 │ +7 (+123 -116)\n");
        }
        out
    }

    pub(crate) fn parsed(&self) -> ParsedReport {
        parse_report(&self.render()).expect("fixture report should parse")
    }
}
