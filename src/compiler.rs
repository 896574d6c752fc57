//! AST-to-bytecode compiler. Variables live in a single flat table keyed by name across all
//! scopes, including function parameters — a deliberate simplification made sound for
//! recursion only because the VM saves and restores the table segment per call frame.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use crate::ast::{BinaryOp, Expr, Literal, Program, Stmt, UnaryOp};
use crate::bytecode::{BytecodeProgram, Opcode, Value};
use crate::error::{Diagnostic, DiagnosticKind, Position};
use crate::lang_table::LanguageEntry;

#[derive(Debug, Clone, Copy)]
struct FunctionInfo {
    address: usize,
    arity: usize,
}

pub struct Compiler<'a> {
    program: BytecodeProgram,
    variables: HashMap<String, usize>,
    functions: HashMap<String, FunctionInfo>,
    /// Names whose real address is already known — either hoisted-and-then-compiled, or
    /// reached mid-compile via `compile_fun_decl`. Anything else in `functions` still holds a
    /// placeholder address and needs a `pending_function_refs` entry patched in later.
    compiled_functions: HashSet<String>,
    /// `(constant pool index, function name)` pairs recorded for a function reference emitted
    /// before that function's body was compiled, so its placeholder constant can be overwritten
    /// with the real address once the whole program has been walked.
    pending_function_refs: Vec<(usize, String)>,
    /// Counts placeholder addresses handed out during hoisting; each one is unique so two
    /// same-arity, not-yet-compiled functions never collide in the constant pool's
    /// value-equality dedup.
    placeholder_counter: usize,
    next_var: usize,
    lang: &'a LanguageEntry,
}

impl<'a> Compiler<'a> {
    pub fn new(lang: &'a LanguageEntry) -> Self {
        Self {
            program: BytecodeProgram::new(),
            variables: HashMap::new(),
            functions: HashMap::new(),
            compiled_functions: HashSet::new(),
            pending_function_refs: Vec::new(),
            placeholder_counter: 0,
            next_var: 0,
            lang,
        }
    }

    pub fn compile(mut self, ast: &Program) -> Result<BytecodeProgram, Diagnostic> {
        debug!("compiling {} top-level statement(s)", ast.statements.len());
        self.hoist_functions(&ast.statements);
        for stmt in &ast.statements {
            self.compile_stmt(stmt)?;
        }
        self.program.emit(Opcode::Halt);
        self.patch_function_refs();
        Ok(self.program)
    }

    /// Registers every `FunDecl`'s name and arity before any body is compiled, so a call that
    /// textually precedes the callee's declaration (mutual recursion, or simply calling a
    /// sibling function defined later) still resolves. The address recorded here is a
    /// placeholder; `compile_fun_decl` overwrites it with the real one when it actually reaches
    /// that declaration, and any reference emitted in the meantime is patched at the end of
    /// `compile` via `pending_function_refs`.
    ///
    /// Recurses into every place a `declaration` (and so a nested `FunDecl`) can appear:
    /// blocks, and the bodies of `if`/`while`/`for`.
    fn hoist_functions(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.hoist_stmt(stmt);
        }
    }

    fn hoist_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::FunDecl {
                name, params, body, ..
            } => {
                let address = self.reserve_placeholder_address();
                self.functions.insert(
                    name.to_string(),
                    FunctionInfo {
                        address,
                        arity: params.len(),
                    },
                );
                self.hoist_functions(body);
            }
            Stmt::If {
                then_branch,
                else_branch,
                ..
            } => {
                self.hoist_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.hoist_stmt(else_branch);
                }
            }
            Stmt::While { body, .. } => self.hoist_stmt(body),
            Stmt::For { body, .. } => self.hoist_stmt(body),
            Stmt::Block { statements, .. } => self.hoist_functions(statements),
            Stmt::VarDecl { .. } | Stmt::Return { .. } | Stmt::ExprStmt { .. } => {}
        }
    }

    /// A placeholder address guaranteed never to collide with a real instruction address or
    /// another placeholder, so distinct not-yet-compiled functions of the same arity don't get
    /// merged into one constant by `BytecodeProgram::add_constant`'s value-equality dedup.
    fn reserve_placeholder_address(&mut self) -> usize {
        let address = usize::MAX - self.placeholder_counter;
        self.placeholder_counter += 1;
        address
    }

    fn resolve_or_declare_var(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.variables.get(name) {
            return idx;
        }
        let idx = self.next_var;
        self.next_var += 1;
        self.variables.insert(name.to_string(), idx);
        idx
    }

    fn compile_stmt(&mut self, stmt: &Stmt) -> Result<(), Diagnostic> {
        match stmt {
            Stmt::VarDecl {
                name, initializer, ..
            } => {
                match initializer {
                    Some(expr) => self.compile_expr(expr)?,
                    None => {
                        self.emit_const(Value::Null);
                    }
                }
                let idx = self.resolve_or_declare_var(name);
                self.program.emit(Opcode::StoreVar(idx));
                self.program.emit(Opcode::Pop);
                Ok(())
            }
            Stmt::FunDecl {
                name, params, body, ..
            } => self.compile_fun_decl(name, params, body),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => self.compile_if(condition, then_branch, else_branch.as_deref()),
            Stmt::While {
                condition, body, ..
            } => self.compile_while(condition, body),
            Stmt::For {
                initializer,
                condition,
                increment,
                body,
                ..
            } => self.compile_for(
                initializer.as_deref(),
                condition.as_ref(),
                increment.as_ref(),
                body,
            ),
            Stmt::Return { value, position } => self.compile_return(value.as_ref(), *position),
            Stmt::Block { statements, .. } => {
                for stmt in statements {
                    self.compile_stmt(stmt)?;
                }
                Ok(())
            }
            Stmt::ExprStmt { expr, .. } => {
                self.compile_expr(expr)?;
                self.program.emit(Opcode::Pop);
                Ok(())
            }
        }
    }

    fn compile_if(
        &mut self,
        condition: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
    ) -> Result<(), Diagnostic> {
        self.compile_expr(condition)?;
        let jump_if_false = self.program.emit(Opcode::JumpIfFalse(0));
        self.compile_stmt(then_branch)?;

        if let Some(else_branch) = else_branch {
            let jump_over_else = self.program.emit(Opcode::Jump(0));
            self.patch_jump(jump_if_false);
            self.compile_stmt(else_branch)?;
            self.patch_jump(jump_over_else);
        } else {
            self.patch_jump(jump_if_false);
        }
        Ok(())
    }

    fn compile_while(&mut self, condition: &Expr, body: &Stmt) -> Result<(), Diagnostic> {
        let loop_start = self.program.current_address();
        self.compile_expr(condition)?;
        let jump_if_false = self.program.emit(Opcode::JumpIfFalse(0));
        self.compile_stmt(body)?;
        self.program.emit(Opcode::Jump(loop_start));
        self.patch_jump(jump_if_false);
        Ok(())
    }

    fn compile_for(
        &mut self,
        initializer: Option<&Stmt>,
        condition: Option<&Expr>,
        increment: Option<&Expr>,
        body: &Stmt,
    ) -> Result<(), Diagnostic> {
        if let Some(initializer) = initializer {
            self.compile_stmt(initializer)?;
        }

        let loop_start = self.program.current_address();
        match condition {
            Some(condition) => self.compile_expr(condition)?,
            None => self.emit_const(Value::Boolean(true)),
        }
        let jump_if_false = self.program.emit(Opcode::JumpIfFalse(0));

        self.compile_stmt(body)?;

        if let Some(increment) = increment {
            self.compile_expr(increment)?;
            self.program.emit(Opcode::Pop);
        }
        self.program.emit(Opcode::Jump(loop_start));
        self.patch_jump(jump_if_false);
        Ok(())
    }

    fn compile_return(
        &mut self,
        value: Option<&Expr>,
        _position: Position,
    ) -> Result<(), Diagnostic> {
        match value {
            Some(expr) => self.compile_expr(expr)?,
            None => self.emit_const(Value::Null),
        }
        self.program.emit(Opcode::Return);
        Ok(())
    }

    /// Registers the function, binds its parameters (in reverse, to match stack argument
    /// order), emits the body, and jumps around the whole thing so normal top-level execution
    /// never falls into it.
    fn compile_fun_decl(
        &mut self,
        name: &str,
        params: &[String],
        body: &[Stmt],
    ) -> Result<(), Diagnostic> {
        let jump_over = self.program.emit(Opcode::Jump(0));
        let address = self.program.current_address();

        self.functions.insert(
            name.to_string(),
            FunctionInfo {
                address,
                arity: params.len(),
            },
        );
        // Marked compiled before the body is walked, so a self-recursive call inside `body`
        // sees the real address directly and is never queued in `pending_function_refs`.
        self.compiled_functions.insert(name.to_string());

        for param in params.iter().rev() {
            let idx = self.resolve_or_declare_var(param);
            self.program.emit(Opcode::StoreVar(idx));
            self.program.emit(Opcode::Pop);
        }

        for stmt in body {
            self.compile_stmt(stmt)?;
        }

        self.emit_const(Value::Null);
        self.program.emit(Opcode::Return);

        self.patch_jump(jump_over);
        Ok(())
    }

    fn compile_expr(&mut self, expr: &Expr) -> Result<(), Diagnostic> {
        match expr {
            Expr::Literal {
                value: Literal::Number(text),
                ..
            } => {
                // Deferred per `Literal::Number`: push the raw lexeme text and let `ToNumber`
                // attempt the conversion at execution time.
                self.emit_const(Value::String(text.clone()));
                self.program.emit(Opcode::ToNumber);
                Ok(())
            }
            Expr::Literal { value, .. } => {
                self.emit_const(literal_to_value(value));
                Ok(())
            }
            Expr::Identifier { name, position } => self.compile_identifier(name, *position),
            Expr::Assign { name, value, .. } => {
                self.compile_expr(value)?;
                let idx = self.resolve_or_declare_var(name);
                self.program.emit(Opcode::StoreVar(idx));
                Ok(())
            }
            Expr::Unary { op, operand, .. } => {
                self.compile_expr(operand)?;
                self.program.emit(match op {
                    UnaryOp::Negate => Opcode::Negate,
                    UnaryOp::Not => Opcode::Not,
                });
                Ok(())
            }
            Expr::Binary {
                left, op, right, ..
            } => {
                self.compile_expr(left)?;
                self.compile_expr(right)?;
                self.program.emit(binary_op_to_opcode(*op));
                Ok(())
            }
            Expr::Call {
                callee,
                args,
                position,
            } => self.compile_call(callee, args, *position),
        }
    }

    fn compile_identifier(&mut self, name: &str, position: Position) -> Result<(), Diagnostic> {
        if let Some(&idx) = self.variables.get(name) {
            self.program.emit(Opcode::LoadVar(idx));
            return Ok(());
        }
        if let Some(info) = self.functions.get(name) {
            let address = info.address;
            let arity = info.arity;
            let idx = self.emit_const_function(Value::Function { address, arity });
            if !self.compiled_functions.contains(name) {
                self.pending_function_refs.push((idx, name.to_string()));
            }
            return Ok(());
        }
        Err(Diagnostic::new(
            DiagnosticKind::UndefinedName,
            format!("undefined name '{name}'"),
            position,
        ))
    }

    fn compile_call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        position: Position,
    ) -> Result<(), Diagnostic> {
        if let Expr::Identifier { name, .. } = callee {
            if self.is_builtin_print(name) {
                for arg in args {
                    self.compile_expr(arg)?;
                }
                self.program.emit(Opcode::Print(args.len()));
                // PRINT is a statement-shaped builtin; calls are expressions, so leave a
                // value on the stack the way any other expression does.
                self.emit_const(Value::Null);
                return Ok(());
            }
            if self.is_builtin_input(name) {
                self.program.emit(Opcode::Input);
                return Ok(());
            }
        }

        for arg in args {
            self.compile_expr(arg)?;
        }
        self.compile_expr(callee)?;
        trace!("emitting CALL at {position} with {} arg(s)", args.len());
        self.program.emit(Opcode::Call(args.len()));
        Ok(())
    }

    fn is_builtin_print(&self, name: &str) -> bool {
        self.lang.is_print(name)
    }

    fn is_builtin_input(&self, name: &str) -> bool {
        self.lang.is_input(name)
    }

    fn emit_const(&mut self, value: Value) {
        let idx = self.program.add_constant(value);
        self.program.emit(Opcode::LoadConst(idx));
    }

    /// Like `emit_const`, but returns the constant pool index so a not-yet-compiled function
    /// reference can be recorded for later patching.
    fn emit_const_function(&mut self, value: Value) -> usize {
        let idx = self.program.add_constant(value);
        self.program.emit(Opcode::LoadConst(idx));
        idx
    }

    /// Overwrites every placeholder function constant recorded in `pending_function_refs` with
    /// the real address now that the whole program has been compiled and every hoisted function
    /// has necessarily been reached.
    fn patch_function_refs(&mut self) {
        for (idx, name) in std::mem::take(&mut self.pending_function_refs) {
            let info = self.functions[name.as_str()];
            self.program.constants[idx] = Value::Function {
                address: info.address,
                arity: info.arity,
            };
        }
    }

    fn patch_jump(&mut self, at: usize) {
        let target = self.program.current_address();
        self.program.instructions[at] = match self.program.instructions[at] {
            Opcode::Jump(_) => Opcode::Jump(target),
            Opcode::JumpIfFalse(_) => Opcode::JumpIfFalse(target),
            Opcode::JumpIfTrue(_) => Opcode::JumpIfTrue(target),
            other => panic!("attempted to patch a non-jump instruction: {other:?}"),
        };
    }
}

/// Converts every literal except `Number`, which is compiled via `ToNumber` instead (see
/// `compile_expr`) since its conversion can fail and must be reported at VM time.
fn literal_to_value(literal: &Literal) -> Value {
    match literal {
        Literal::Number(_) => unreachable!("numeric literals are compiled via ToNumber"),
        Literal::String(s) => Value::String(s.clone()),
        Literal::Boolean(b) => Value::Boolean(*b),
        Literal::Null => Value::Null,
    }
}

fn binary_op_to_opcode(op: BinaryOp) -> Opcode {
    match op {
        BinaryOp::Add => Opcode::Add,
        BinaryOp::Subtract => Opcode::Subtract,
        BinaryOp::Multiply => Opcode::Multiply,
        BinaryOp::Divide => Opcode::Divide,
        BinaryOp::Modulo => Opcode::Modulo,
        BinaryOp::Equal => Opcode::Equal,
        BinaryOp::NotEqual => Opcode::NotEqual,
        BinaryOp::LessThan => Opcode::LessThan,
        BinaryOp::GreaterThan => Opcode::GreaterThan,
        BinaryOp::LessEqual => Opcode::LessEqual,
        BinaryOp::GreaterEqual => Opcode::GreaterEqual,
        BinaryOp::And => Opcode::And,
        BinaryOp::Or => Opcode::Or,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang_table;
    use crate::lexer::{strip_newlines, Lexer};
    use crate::parser::Parser;

    fn compile(source: &str) -> Result<BytecodeProgram, Diagnostic> {
        let lang = lang_table::lookup("en").unwrap();
        let tokens = strip_newlines(Lexer::new(source, lang).lex());
        let ast = Parser::new(tokens).parse_program().unwrap();
        Compiler::new(lang).compile(&ast)
    }

    #[test]
    fn var_decl_without_initializer_loads_null() {
        let program = compile("var x;").unwrap();
        assert!(matches!(program.instructions[0], Opcode::LoadConst(_)));
        assert_eq!(program.constants[0], Value::Null);
    }

    #[test]
    fn undefined_identifier_is_a_compile_error() {
        let err = compile("var x = y;").unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::UndefinedName);
    }

    #[test]
    fn print_call_emits_print_opcode_with_arg_count() {
        let program = compile(r#"print("hi", "there");"#).unwrap();
        assert!(program
            .instructions
            .iter()
            .any(|op| matches!(op, Opcode::Print(2))));
    }

    #[test]
    fn function_declaration_is_skipped_over_at_top_level() {
        let program = compile("function f() { return 1; } var x = 1;").unwrap();
        assert!(matches!(program.instructions[0], Opcode::Jump(_)));
    }

    #[test]
    fn function_call_emits_call_with_matching_arity() {
        let program = compile("function add(a, b) { return a + b; } add(1, 2);").unwrap();
        assert!(program
            .instructions
            .iter()
            .any(|op| matches!(op, Opcode::Call(2))));
    }

    #[test]
    fn constant_pool_deduplicates_repeated_literals() {
        let program = compile("var a = 1; var b = 1;").unwrap();
        assert_eq!(
            program
                .constants
                .iter()
                .filter(|v| **v == Value::String("1".to_string()))
                .count(),
            1
        );
    }

    #[test]
    fn mutual_recursion_resolves_a_forward_function_reference() {
        let program = compile(
            "function is_even(n) { if (n == 0) { return true; } return is_odd(n - 1); } \
             function is_odd(n) { if (n == 0) { return false; } return is_even(n - 1); }",
        )
        .unwrap();
        assert!(program
            .constants
            .iter()
            .all(|v| !matches!(v, Value::Function { address, .. } if *address == usize::MAX)));
    }
}
