//! Scope classification: a pre-order walk of a parsed module that builds
//! the line-to-context table and the raw per-scope complexity record.

use line_numbers::LinePositions;
use rustpython_parser::ast::{ExceptHandler, Expr, Stmt};

use super::ScopeComplexity;
use crate::core::{normalize_scope_key, ScopeFrame, ScopeKind};

/// Output of the classification pass over one parsed module.
#[derive(Debug)]
pub struct ScopeTables {
    /// Tagged context string per source line, index = line - 1.
    pub contexts: Vec<String>,
    pub complexity: ScopeComplexity,
}

/// Walks statements and expressions in pre-order, maintaining an explicit
/// stack of scope frames and a monotone fill cursor over source lines.
///
/// The context string starts as the namespace prefix and becomes empty once
/// the stack first drains; module-level lines after the first top-level
/// definition therefore resolve to an empty key. Nodes whose reported line
/// precedes the cursor (leading decorators) are skipped, never rewound.
/// Both behaviors are load-bearing for downstream consumers.
pub struct ScopeClassifier<'a> {
    positions: &'a LinePositions,
    frames: Vec<ScopeFrame>,
    context: String,
    next_line: usize,
    contexts: Vec<String>,
    complexity: ScopeComplexity,
}

impl<'a> ScopeClassifier<'a> {
    pub fn new(prefix: &str, positions: &'a LinePositions) -> Self {
        Self {
            positions,
            frames: Vec::new(),
            context: prefix.to_string(),
            next_line: 1,
            contexts: Vec::new(),
            complexity: ScopeComplexity::default(),
        }
    }

    /// Classify a module body, consuming the classifier.
    pub fn classify(mut self, body: &[Stmt]) -> ScopeTables {
        if body.is_empty() {
            // Degenerate module: a single table entry keyed to the prefix.
            self.contexts.push(self.context.clone());
        } else {
            for stmt in body {
                self.visit_stmt(stmt);
            }
        }
        ScopeTables {
            contexts: self.contexts,
            complexity: self.complexity,
        }
    }

    fn line_of(&self, offset: impl Into<usize>) -> usize {
        self.positions.from_offset(offset.into()).as_usize() + 1
    }

    /// Fill the context table up to `line` (exclusive) with the current
    /// context. A cursor already past `line` means a node reported a line
    /// behind us; the fill is skipped entirely.
    fn fill_to(&mut self, line: usize) {
        if self.next_line > line {
            return;
        }
        while self.next_line < line {
            self.contexts.push(self.context.clone());
            self.next_line += 1;
        }
    }

    /// Fill through the line on which a non-scope node starts.
    fn fill_node(&mut self, offset: impl Into<usize>) {
        let line = self.line_of(offset);
        self.fill_to(line + 1);
    }

    fn update_context(&mut self) {
        self.context = if self.frames.is_empty() {
            String::new()
        } else {
            self.frames
                .iter()
                .map(ScopeFrame::to_string)
                .collect::<Vec<_>>()
                .join(".")
        };
    }

    fn enter_scope(&mut self, line: usize, identifier: &str, kind: ScopeKind) {
        self.fill_to(line);
        self.frames.push(ScopeFrame::new(identifier, kind));
        self.update_context();
    }

    fn leave_scope(&mut self) {
        self.frames.pop();
        self.update_context();
    }

    /// Base-cost rule: a completed function definition costs one decision
    /// point, applied after its frame is popped.
    fn record_definition(&mut self, identifier: &str) {
        let key = normalize_scope_key(&format!("{}.{}", self.context, identifier));
        self.complexity.increment(key);
    }

    /// A completed class keeps whatever its body accrued, or gets a zeroed
    /// record so the rollup can see the container.
    fn record_container(&mut self, identifier: &str) {
        let key = normalize_scope_key(&format!("{}.{}", self.context, identifier));
        self.complexity.seed(key);
    }

    /// Branch-like statements charge the currently enclosing scope.
    fn record_branch(&mut self) {
        let key = normalize_scope_key(&self.context);
        self.complexity.increment(key);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::FunctionDef(def) => {
                let line = self.line_of(def.range.start());
                self.enter_scope(line, def.name.as_str(), ScopeKind::Function);
                for stmt in &def.body {
                    self.visit_stmt(stmt);
                }
                for decorator in &def.decorator_list {
                    self.visit_expr(decorator);
                }
                self.leave_scope();
                self.record_definition(def.name.as_str());
            }
            Stmt::AsyncFunctionDef(def) => {
                let line = self.line_of(def.range.start());
                self.enter_scope(line, def.name.as_str(), ScopeKind::AsyncFunction);
                for stmt in &def.body {
                    self.visit_stmt(stmt);
                }
                for decorator in &def.decorator_list {
                    self.visit_expr(decorator);
                }
                self.leave_scope();
                self.record_definition(def.name.as_str());
            }
            Stmt::ClassDef(def) => {
                let line = self.line_of(def.range.start());
                self.enter_scope(line, def.name.as_str(), ScopeKind::Class);
                for stmt in &def.body {
                    self.visit_stmt(stmt);
                }
                for decorator in &def.decorator_list {
                    self.visit_expr(decorator);
                }
                self.leave_scope();
                self.record_container(def.name.as_str());
            }
            Stmt::If(s) => {
                self.record_branch();
                self.fill_node(s.range.start());
                self.visit_expr(&s.test);
                self.visit_body(&s.body);
                self.visit_body(&s.orelse);
            }
            Stmt::While(s) => {
                self.record_branch();
                self.fill_node(s.range.start());
                self.visit_expr(&s.test);
                self.visit_body(&s.body);
                self.visit_body(&s.orelse);
            }
            Stmt::For(s) => {
                self.record_branch();
                self.fill_node(s.range.start());
                self.visit_expr(&s.target);
                self.visit_expr(&s.iter);
                self.visit_body(&s.body);
                self.visit_body(&s.orelse);
            }
            Stmt::AsyncFor(s) => {
                self.record_branch();
                self.fill_node(s.range.start());
                self.visit_expr(&s.target);
                self.visit_expr(&s.iter);
                self.visit_body(&s.body);
                self.visit_body(&s.orelse);
            }
            Stmt::Try(s) => {
                self.record_branch();
                self.fill_node(s.range.start());
                self.visit_body(&s.body);
                for handler in &s.handlers {
                    self.visit_handler(handler);
                }
                self.visit_body(&s.orelse);
                self.visit_body(&s.finalbody);
            }
            Stmt::TryStar(s) => {
                self.record_branch();
                self.fill_node(s.range.start());
                self.visit_body(&s.body);
                for handler in &s.handlers {
                    self.visit_handler(handler);
                }
                self.visit_body(&s.orelse);
                self.visit_body(&s.finalbody);
            }
            Stmt::With(s) => {
                self.record_branch();
                self.fill_node(s.range.start());
                for item in &s.items {
                    self.visit_expr(&item.context_expr);
                    if let Some(vars) = &item.optional_vars {
                        self.visit_expr(vars);
                    }
                }
                self.visit_body(&s.body);
            }
            Stmt::AsyncWith(s) => {
                self.record_branch();
                self.fill_node(s.range.start());
                for item in &s.items {
                    self.visit_expr(&item.context_expr);
                    if let Some(vars) = &item.optional_vars {
                        self.visit_expr(vars);
                    }
                }
                self.visit_body(&s.body);
            }
            Stmt::Match(s) => {
                self.fill_node(s.range.start());
                self.visit_expr(&s.subject);
                for case in &s.cases {
                    if let Some(guard) = &case.guard {
                        self.visit_expr(guard);
                    }
                    self.visit_body(&case.body);
                }
            }
            Stmt::Return(s) => {
                self.fill_node(s.range.start());
                if let Some(value) = &s.value {
                    self.visit_expr(value);
                }
            }
            Stmt::Delete(s) => {
                self.fill_node(s.range.start());
                for target in &s.targets {
                    self.visit_expr(target);
                }
            }
            Stmt::Assign(s) => {
                self.fill_node(s.range.start());
                for target in &s.targets {
                    self.visit_expr(target);
                }
                self.visit_expr(&s.value);
            }
            Stmt::AugAssign(s) => {
                self.fill_node(s.range.start());
                self.visit_expr(&s.target);
                self.visit_expr(&s.value);
            }
            Stmt::AnnAssign(s) => {
                self.fill_node(s.range.start());
                self.visit_expr(&s.target);
                self.visit_expr(&s.annotation);
                if let Some(value) = &s.value {
                    self.visit_expr(value);
                }
            }
            Stmt::Raise(s) => {
                self.fill_node(s.range.start());
                if let Some(exc) = &s.exc {
                    self.visit_expr(exc);
                }
                if let Some(cause) = &s.cause {
                    self.visit_expr(cause);
                }
            }
            Stmt::Assert(s) => {
                self.fill_node(s.range.start());
                self.visit_expr(&s.test);
                if let Some(msg) = &s.msg {
                    self.visit_expr(msg);
                }
            }
            Stmt::Expr(s) => {
                self.fill_node(s.range.start());
                self.visit_expr(&s.value);
            }
            Stmt::Import(s) => self.fill_node(s.range.start()),
            Stmt::ImportFrom(s) => self.fill_node(s.range.start()),
            Stmt::Global(s) => self.fill_node(s.range.start()),
            Stmt::Nonlocal(s) => self.fill_node(s.range.start()),
            Stmt::Pass(s) => self.fill_node(s.range.start()),
            Stmt::Break(s) => self.fill_node(s.range.start()),
            Stmt::Continue(s) => self.fill_node(s.range.start()),
            _ => {}
        }
    }

    fn visit_body(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.visit_stmt(stmt);
        }
    }

    fn visit_handler(&mut self, handler: &ExceptHandler) {
        let ExceptHandler::ExceptHandler(h) = handler;
        self.fill_node(h.range.start());
        if let Some(type_) = &h.type_ {
            self.visit_expr(type_);
        }
        self.visit_body(&h.body);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::BoolOp(e) => {
                self.fill_node(e.range.start());
                for value in &e.values {
                    self.visit_expr(value);
                }
            }
            Expr::NamedExpr(e) => {
                self.fill_node(e.range.start());
                self.visit_expr(&e.target);
                self.visit_expr(&e.value);
            }
            Expr::BinOp(e) => {
                self.fill_node(e.range.start());
                self.visit_expr(&e.left);
                self.visit_expr(&e.right);
            }
            Expr::UnaryOp(e) => {
                self.fill_node(e.range.start());
                self.visit_expr(&e.operand);
            }
            Expr::Lambda(e) => {
                self.fill_node(e.range.start());
                self.visit_expr(&e.body);
            }
            Expr::IfExp(e) => {
                self.fill_node(e.range.start());
                self.visit_expr(&e.test);
                self.visit_expr(&e.body);
                self.visit_expr(&e.orelse);
            }
            Expr::Dict(e) => {
                self.fill_node(e.range.start());
                for key in e.keys.iter().flatten() {
                    self.visit_expr(key);
                }
                for value in &e.values {
                    self.visit_expr(value);
                }
            }
            Expr::Set(e) => {
                self.fill_node(e.range.start());
                for elt in &e.elts {
                    self.visit_expr(elt);
                }
            }
            Expr::ListComp(e) => {
                self.fill_node(e.range.start());
                self.visit_expr(&e.elt);
                for generator in &e.generators {
                    self.visit_comprehension(generator);
                }
            }
            Expr::SetComp(e) => {
                self.fill_node(e.range.start());
                self.visit_expr(&e.elt);
                for generator in &e.generators {
                    self.visit_comprehension(generator);
                }
            }
            Expr::DictComp(e) => {
                self.fill_node(e.range.start());
                self.visit_expr(&e.key);
                self.visit_expr(&e.value);
                for generator in &e.generators {
                    self.visit_comprehension(generator);
                }
            }
            Expr::GeneratorExp(e) => {
                self.fill_node(e.range.start());
                self.visit_expr(&e.elt);
                for generator in &e.generators {
                    self.visit_comprehension(generator);
                }
            }
            Expr::Await(e) => {
                self.fill_node(e.range.start());
                self.visit_expr(&e.value);
            }
            Expr::Yield(e) => {
                self.fill_node(e.range.start());
                if let Some(value) = &e.value {
                    self.visit_expr(value);
                }
            }
            Expr::YieldFrom(e) => {
                self.fill_node(e.range.start());
                self.visit_expr(&e.value);
            }
            Expr::Compare(e) => {
                self.fill_node(e.range.start());
                self.visit_expr(&e.left);
                for comparator in &e.comparators {
                    self.visit_expr(comparator);
                }
            }
            Expr::Call(e) => {
                self.fill_node(e.range.start());
                self.visit_expr(&e.func);
                for arg in &e.args {
                    self.visit_expr(arg);
                }
                for keyword in &e.keywords {
                    self.visit_expr(&keyword.value);
                }
            }
            Expr::FormattedValue(e) => {
                self.fill_node(e.range.start());
                self.visit_expr(&e.value);
            }
            Expr::JoinedStr(e) => {
                self.fill_node(e.range.start());
                for value in &e.values {
                    self.visit_expr(value);
                }
            }
            Expr::Constant(e) => self.fill_node(e.range.start()),
            Expr::Attribute(e) => {
                self.fill_node(e.range.start());
                self.visit_expr(&e.value);
            }
            Expr::Subscript(e) => {
                self.fill_node(e.range.start());
                self.visit_expr(&e.value);
                self.visit_expr(&e.slice);
            }
            Expr::Starred(e) => {
                self.fill_node(e.range.start());
                self.visit_expr(&e.value);
            }
            Expr::Name(e) => self.fill_node(e.range.start()),
            Expr::List(e) => {
                self.fill_node(e.range.start());
                for elt in &e.elts {
                    self.visit_expr(elt);
                }
            }
            Expr::Tuple(e) => {
                self.fill_node(e.range.start());
                for elt in &e.elts {
                    self.visit_expr(elt);
                }
            }
            Expr::Slice(e) => {
                self.fill_node(e.range.start());
                if let Some(lower) = &e.lower {
                    self.visit_expr(lower);
                }
                if let Some(upper) = &e.upper {
                    self.visit_expr(upper);
                }
                if let Some(step) = &e.step {
                    self.visit_expr(step);
                }
            }
            _ => {}
        }
    }

    fn visit_comprehension(&mut self, generator: &rustpython_parser::ast::Comprehension) {
        self.visit_expr(&generator.target);
        self.visit_expr(&generator.iter);
        for if_clause in &generator.ifs {
            self.visit_expr(if_clause);
        }
    }
}
