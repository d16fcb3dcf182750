//! Single-pass compilation engine.
//!
//! Recursive descent over the Jack grammar, emitting VM commands as a side
//! effect of parsing. There is no AST: the engine consumes the token
//! stream once, resolving names through the symbol table as it goes and
//! writing bytecode into the VM writer. Each `compile_*` method owns one
//! grammar non-terminal.

use crate::cursor::TokenCursor;
use crate::error::CompileError;
use crate::symbols::{SymbolKind, SymbolTable};
use crate::tokenizer::{Token, TokenKind};
use crate::writer::{Arithmetic, Segment, VmWriter};

/// OS classes resolvable by name without a declaration. Code for them is
/// supplied by the VM linker.
pub const BUILTIN_CLASSES: [&str; 8] = [
    "Math", "String", "Array", "Output", "Screen", "Keyboard", "Memory", "Sys",
];

/// Binary operators, applied strictly left to right with no precedence.
const BINARY_OPS: [&str; 9] = ["+", "-", "*", "/", "&", "|", "<", ">", "="];

const STATEMENT_KEYWORDS: [&str; 5] = ["let", "if", "while", "do", "return"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

pub struct CompilationEngine {
    cursor: TokenCursor,
    symbols: SymbolTable,
    writer: VmWriter,
    class_name: String,
    label_count: usize,
    subroutine_kind: SubroutineKind,
}

impl CompilationEngine {
    pub fn new(tokens: Vec<Token>) -> Self {
        CompilationEngine {
            cursor: TokenCursor::new(tokens),
            symbols: SymbolTable::new(),
            writer: VmWriter::new(),
            class_name: String::new(),
            label_count: 0,
            subroutine_kind: SubroutineKind::Function,
        }
    }

    /// Compile one class and return the complete VM text.
    pub fn compile(mut self) -> Result<String, CompileError> {
        self.compile_class()?;
        Ok(self.writer.into_output())
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    /// class: 'class' className '{' classVarDec* subroutineDec* '}'
    fn compile_class(&mut self) -> Result<(), CompileError> {
        self.cursor.expect(&["class"])?;
        let name = self.cursor.expect_identifier()?;
        self.class_name = name.text;
        self.cursor.expect(&["{"])?;

        while self.cursor.at_any(&["static", "field"]) {
            self.compile_class_var_dec()?;
        }
        while self.cursor.at_any(&["constructor", "function", "method"]) {
            self.compile_subroutine_dec()?;
        }

        self.cursor.expect(&["}"])?;
        if self.cursor.has_more() {
            return Err(self.cursor.mismatch("end of file"));
        }
        Ok(())
    }

    /// classVarDec: ('static' | 'field') type varName (',' varName)* ';'
    fn compile_class_var_dec(&mut self) -> Result<(), CompileError> {
        let keyword = self.cursor.expect(&["static", "field"])?;
        let kind = if keyword == "static" {
            SymbolKind::Static
        } else {
            SymbolKind::Field
        };
        let ty = self.expect_type()?;
        loop {
            let name = self.cursor.expect_identifier()?;
            self.define(&name.text, &ty, kind, name.line)?;
            if self.cursor.at(",") {
                self.cursor.advance();
            } else {
                break;
            }
        }
        self.cursor.expect(&[";"])?;
        Ok(())
    }

    /// subroutineDec: ('constructor' | 'function' | 'method')
    ///                ('void' | type) subroutineName '(' parameterList ')'
    ///                subroutineBody
    fn compile_subroutine_dec(&mut self) -> Result<(), CompileError> {
        let keyword = self.cursor.expect(&["constructor", "function", "method"])?;
        self.subroutine_kind = match keyword.text.as_str() {
            "constructor" => SubroutineKind::Constructor,
            "method" => SubroutineKind::Method,
            _ => SubroutineKind::Function,
        };
        self.symbols.start_subroutine();
        self.label_count = 0;

        if self.cursor.at("void") {
            self.cursor.advance();
        } else {
            self.expect_type()?;
        }
        let name = self.cursor.expect_identifier()?;

        // methods receive the object as hidden argument 0
        if self.subroutine_kind == SubroutineKind::Method {
            let class_name = self.class_name.clone();
            self.define("this", &class_name, SymbolKind::Argument, keyword.line)?;
        }

        self.cursor.expect(&["("])?;
        self.compile_parameter_list()?;
        self.cursor.expect(&[")"])?;
        self.compile_subroutine_body(&name.text)
    }

    /// parameterList: ((type varName) (',' type varName)*)?
    fn compile_parameter_list(&mut self) -> Result<(), CompileError> {
        if self.cursor.at(")") {
            return Ok(());
        }
        loop {
            let ty = self.expect_type()?;
            let name = self.cursor.expect_identifier()?;
            self.define(&name.text, &ty, SymbolKind::Argument, name.line)?;
            if self.cursor.at(",") {
                self.cursor.advance();
            } else {
                break;
            }
        }
        Ok(())
    }

    /// subroutineBody: '{' varDec* statements '}'
    ///
    /// The `function` command needs the local count, so locals are scanned
    /// before anything is emitted; the constructor/method prologue follows
    /// immediately after the header.
    fn compile_subroutine_body(&mut self, name: &str) -> Result<(), CompileError> {
        self.cursor.expect(&["{"])?;
        while self.cursor.at("var") {
            self.compile_var_dec()?;
        }

        let n_locals = self.symbols.count(SymbolKind::Local);
        let full_name = format!("{}.{}", self.class_name, name);
        self.writer.write_function(&full_name, n_locals);

        match self.subroutine_kind {
            SubroutineKind::Constructor => {
                let n_fields = self.symbols.count(SymbolKind::Field);
                self.writer.write_push(Segment::Constant, n_fields);
                self.writer.write_call("Memory.alloc", 1);
                self.writer.write_pop(Segment::Pointer, 0);
            }
            SubroutineKind::Method => {
                self.writer.write_push(Segment::Argument, 0);
                self.writer.write_pop(Segment::Pointer, 0);
            }
            SubroutineKind::Function => {}
        }

        self.compile_statements()?;
        self.cursor.expect(&["}"])?;
        Ok(())
    }

    /// varDec: 'var' type varName (',' varName)* ';'
    fn compile_var_dec(&mut self) -> Result<(), CompileError> {
        self.cursor.expect(&["var"])?;
        let ty = self.expect_type()?;
        loop {
            let name = self.cursor.expect_identifier()?;
            self.define(&name.text, &ty, SymbolKind::Local, name.line)?;
            if self.cursor.at(",") {
                self.cursor.advance();
            } else {
                break;
            }
        }
        self.cursor.expect(&[";"])?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn compile_statements(&mut self) -> Result<(), CompileError> {
        while self.cursor.at_any(&STATEMENT_KEYWORDS) {
            match self.cursor.current().map(|t| t.text.as_str()) {
                Some("let") => self.compile_let()?,
                Some("if") => self.compile_if()?,
                Some("while") => self.compile_while()?,
                Some("do") => self.compile_do()?,
                _ => self.compile_return()?,
            }
        }
        Ok(())
    }

    /// letStatement: 'let' varName ('[' expression ']')? '=' expression ';'
    fn compile_let(&mut self) -> Result<(), CompileError> {
        self.cursor.expect(&["let"])?;
        let name = self.cursor.expect_identifier()?;
        let (segment, index) = self.resolve(&name.text, name.line)?;

        let indexed = self.cursor.at("[");
        if indexed {
            self.cursor.advance();
            self.compile_expression()?;
            self.cursor.expect(&["]"])?;
            self.writer.write_push(segment, index);
            self.writer.write_arithmetic(Arithmetic::Add);
        }

        self.cursor.expect(&["="])?;
        self.compile_expression()?;
        self.cursor.expect(&[";"])?;

        if indexed {
            // the RHS may itself have used `that`; the computed target
            // address survives the spill through temp 0
            self.writer.write_pop(Segment::Temp, 0);
            self.writer.write_pop(Segment::Pointer, 1);
            self.writer.write_push(Segment::Temp, 0);
            self.writer.write_pop(Segment::That, 0);
        } else {
            self.writer.write_pop(segment, index);
        }
        Ok(())
    }

    /// ifStatement: 'if' '(' expression ')' '{' statements '}'
    ///              ('else' '{' statements '}')?
    fn compile_if(&mut self) -> Result<(), CompileError> {
        self.cursor.expect(&["if"])?;
        let id = self.next_label_id();
        let false_label = format!("IF_FALSE_{}", id);
        let end_label = format!("IF_END_{}", id);

        self.cursor.expect(&["("])?;
        self.compile_expression()?;
        self.cursor.expect(&[")"])?;
        self.writer.write_arithmetic(Arithmetic::Not);
        self.writer.write_if_goto(&false_label);

        self.cursor.expect(&["{"])?;
        self.compile_statements()?;
        self.cursor.expect(&["}"])?;
        self.writer.write_goto(&end_label);
        self.writer.write_label(&false_label);

        if self.cursor.at("else") {
            self.cursor.advance();
            self.cursor.expect(&["{"])?;
            self.compile_statements()?;
            self.cursor.expect(&["}"])?;
        }
        self.writer.write_label(&end_label);
        Ok(())
    }

    /// whileStatement: 'while' '(' expression ')' '{' statements '}'
    fn compile_while(&mut self) -> Result<(), CompileError> {
        self.cursor.expect(&["while"])?;
        let id = self.next_label_id();
        let exp_label = format!("WHILE_EXP_{}", id);
        let end_label = format!("WHILE_END_{}", id);

        self.writer.write_label(&exp_label);
        self.cursor.expect(&["("])?;
        self.compile_expression()?;
        self.cursor.expect(&[")"])?;
        self.writer.write_arithmetic(Arithmetic::Not);
        self.writer.write_if_goto(&end_label);

        self.cursor.expect(&["{"])?;
        self.compile_statements()?;
        self.cursor.expect(&["}"])?;
        self.writer.write_goto(&exp_label);
        self.writer.write_label(&end_label);
        Ok(())
    }

    /// doStatement: 'do' subroutineCall ';'
    fn compile_do(&mut self) -> Result<(), CompileError> {
        self.cursor.expect(&["do"])?;
        let name = self.cursor.expect_identifier()?;
        self.compile_call(&name.text)?;
        // discard the return value
        self.writer.write_pop(Segment::Temp, 0);
        self.cursor.expect(&[";"])?;
        Ok(())
    }

    /// returnStatement: 'return' expression? ';'
    ///
    /// Inside a constructor the only legal form is `return this;`; the
    /// object base goes back to the caller and anything else is rejected
    /// rather than silently rewritten.
    fn compile_return(&mut self) -> Result<(), CompileError> {
        self.cursor.expect(&["return"])?;

        if self.subroutine_kind == SubroutineKind::Constructor {
            self.cursor.expect(&["this"])?;
            self.cursor.expect(&[";"])?;
            self.writer.write_push(Segment::Pointer, 0);
            self.writer.write_return();
            return Ok(());
        }

        if self.cursor.at(";") {
            self.cursor.advance();
            self.writer.write_push(Segment::Constant, 0);
        } else {
            self.compile_expression()?;
            self.cursor.expect(&[";"])?;
        }
        self.writer.write_return();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    /// expression: term (op term)*
    fn compile_expression(&mut self) -> Result<(), CompileError> {
        self.compile_term()?;
        while self.cursor.at_any(&BINARY_OPS) {
            let op = self.cursor.expect(&BINARY_OPS)?;
            self.compile_term()?;
            match op.text.as_str() {
                "+" => self.writer.write_arithmetic(Arithmetic::Add),
                "-" => self.writer.write_arithmetic(Arithmetic::Sub),
                "&" => self.writer.write_arithmetic(Arithmetic::And),
                "|" => self.writer.write_arithmetic(Arithmetic::Or),
                "<" => self.writer.write_arithmetic(Arithmetic::Lt),
                ">" => self.writer.write_arithmetic(Arithmetic::Gt),
                "=" => self.writer.write_arithmetic(Arithmetic::Eq),
                "*" => self.writer.write_call("Math.multiply", 2),
                _ => self.writer.write_call("Math.divide", 2),
            }
        }
        Ok(())
    }

    /// term: integerConstant | stringConstant | keywordConstant | varName |
    ///       varName '[' expression ']' | subroutineCall |
    ///       '(' expression ')' | unaryOp term
    fn compile_term(&mut self) -> Result<(), CompileError> {
        let Some(token) = self.cursor.current() else {
            return Err(self.cursor.mismatch("a term"));
        };
        let token = token.clone();

        match token.kind {
            TokenKind::IntConst => {
                self.writer.write_push(Segment::Constant, token.int_value());
                self.cursor.advance();
            }
            TokenKind::StringConst => {
                self.compile_string_constant(token.string_value());
                self.cursor.advance();
            }
            TokenKind::Keyword => match token.text.as_str() {
                "true" => {
                    self.writer.write_push(Segment::Constant, 0);
                    self.writer.write_arithmetic(Arithmetic::Not);
                    self.cursor.advance();
                }
                "false" | "null" => {
                    self.writer.write_push(Segment::Constant, 0);
                    self.cursor.advance();
                }
                "this" => {
                    self.writer.write_push(Segment::Pointer, 0);
                    self.cursor.advance();
                }
                _ => return Err(self.cursor.mismatch("a term")),
            },
            TokenKind::Symbol => match token.text.as_str() {
                "(" => {
                    self.cursor.advance();
                    self.compile_expression()?;
                    self.cursor.expect(&[")"])?;
                }
                "-" => {
                    self.cursor.advance();
                    self.compile_term()?;
                    self.writer.write_arithmetic(Arithmetic::Neg);
                }
                "~" => {
                    self.cursor.advance();
                    self.compile_term()?;
                    self.writer.write_arithmetic(Arithmetic::Not);
                }
                _ => return Err(self.cursor.mismatch("a term")),
            },
            TokenKind::Identifier => {
                self.cursor.advance();
                if self.cursor.at("[") {
                    // array read: base + index, then read through `that`
                    let (segment, index) = self.resolve(&token.text, token.line)?;
                    self.writer.write_push(segment, index);
                    self.cursor.advance();
                    self.compile_expression()?;
                    self.cursor.expect(&["]"])?;
                    self.writer.write_arithmetic(Arithmetic::Add);
                    self.writer.write_pop(Segment::Pointer, 1);
                    self.writer.write_push(Segment::That, 0);
                } else if self.cursor.at("(") || self.cursor.at(".") {
                    self.compile_call(&token.text)?;
                } else {
                    let (segment, index) = self.resolve(&token.text, token.line)?;
                    self.writer.write_push(segment, index);
                }
            }
        }
        Ok(())
    }

    /// A string literal becomes a String object built at runtime, one
    /// appendChar call per character.
    fn compile_string_constant(&mut self, value: &str) {
        self.writer.write_push(Segment::Constant, value.chars().count());
        self.writer.write_call("String.new", 1);
        for ch in value.chars() {
            self.writer.write_push(Segment::Constant, ch as usize);
            self.writer.write_call("String.appendChar", 2);
        }
    }

    /// subroutineCall, after its leading identifier has been consumed:
    ///
    /// - `name(...)`: method on the current object;
    /// - `name.sub(...)` with `name` a built-in class or an unknown
    ///   identifier: static call on that class;
    /// - `name.sub(...)` with `name` a known variable: method on that
    ///   object, dispatched through the variable's declared type.
    fn compile_call(&mut self, name: &str) -> Result<(), CompileError> {
        let (callee, receiver_args) = if self.cursor.at(".") {
            self.cursor.advance();
            let sub = self.cursor.expect_identifier()?;
            if BUILTIN_CLASSES.contains(&name) {
                (format!("{}.{}", name, sub.text), 0)
            } else if let Some(symbol) = self.symbols.lookup(name) {
                let segment = symbol.kind.segment();
                let index = symbol.index;
                let ty = symbol.ty.clone();
                self.writer.write_push(segment, index);
                (format!("{}.{}", ty, sub.text), 1)
            } else {
                // unknown receivers are class names, not errors
                (format!("{}.{}", name, sub.text), 0)
            }
        } else {
            self.writer.write_push(Segment::Pointer, 0);
            (format!("{}.{}", self.class_name, name), 1)
        };

        self.cursor.expect(&["("])?;
        let n_args = receiver_args + self.compile_expression_list()?;
        self.cursor.expect(&[")"])?;
        self.writer.write_call(&callee, n_args);
        Ok(())
    }

    /// expressionList: (expression (',' expression)*)?
    ///
    /// Returns the number of expressions compiled.
    fn compile_expression_list(&mut self) -> Result<usize, CompileError> {
        let mut count = 0;
        if !self.cursor.at(")") {
            loop {
                self.compile_expression()?;
                count += 1;
                if self.cursor.at(",") {
                    self.cursor.advance();
                } else {
                    break;
                }
            }
        }
        Ok(count)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// type: 'int' | 'char' | 'boolean' | className
    fn expect_type(&mut self) -> Result<String, CompileError> {
        match self.cursor.current() {
            Some(t)
                if t.kind == TokenKind::Identifier
                    || ["int", "char", "boolean"].contains(&t.text.as_str()) =>
            {
                let text = t.text.clone();
                self.cursor.advance();
                Ok(text)
            }
            _ => Err(self.cursor.mismatch("a type")),
        }
    }

    fn define(
        &mut self,
        name: &str,
        ty: &str,
        kind: SymbolKind,
        line: usize,
    ) -> Result<(), CompileError> {
        self.symbols
            .define(name, ty, kind)
            .map_err(|message| CompileError::Resolution { line, message })
    }

    fn resolve(&self, name: &str, line: usize) -> Result<(Segment, usize), CompileError> {
        self.symbols
            .lookup(name)
            .map(|s| (s.kind.segment(), s.index))
            .ok_or_else(|| CompileError::Resolution {
                line,
                message: format!("undefined variable '{}'", name),
            })
    }

    /// Labels are function-local in the VM, so the counter resets at every
    /// subroutine; one id covers both labels of a statement.
    fn next_label_id(&mut self) -> usize {
        let id = self.label_count;
        self.label_count += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn compile(source: &str) -> String {
        CompilationEngine::new(tokenize(source).unwrap())
            .compile()
            .unwrap()
    }

    fn compile_err(source: &str) -> CompileError {
        CompilationEngine::new(tokenize(source).unwrap())
            .compile()
            .unwrap_err()
    }

    #[test]
    fn test_void_function_bare_return() {
        let vm = compile("class A { function void f() { return; } }");
        assert_eq!(vm, "function A.f 0\npush constant 0\nreturn\n");
    }

    #[test]
    fn test_constructor_allocates_and_returns_this() {
        let vm = compile(
            "class A { field int x; constructor A new() { let x = 42; return this; } }",
        );
        assert_eq!(
            vm,
            "function A.new 0\n\
             push constant 1\n\
             call Memory.alloc 1\n\
             pop pointer 0\n\
             push constant 42\n\
             pop this 0\n\
             push pointer 0\n\
             return\n"
        );
    }

    #[test]
    fn test_method_prologue_and_argument_offset() {
        let vm = compile("class A { method int g(int y) { return y; } }");
        assert_eq!(
            vm,
            "function A.g 0\n\
             push argument 0\n\
             pop pointer 0\n\
             push argument 1\n\
             return\n"
        );
    }

    #[test]
    fn test_array_store_spills_through_temp() {
        let vm = compile(
            "class A { function void f() { var Array a; var int i, j; let a[i] = a[j]; return; } }",
        );
        let expected = "function A.f 3\n\
                        push local 1\n\
                        push local 0\n\
                        add\n\
                        push local 0\n\
                        push local 2\n\
                        add\n\
                        pop pointer 1\n\
                        push that 0\n\
                        pop temp 0\n\
                        pop pointer 1\n\
                        push temp 0\n\
                        pop that 0\n\
                        push constant 0\n\
                        return\n";
        assert_eq!(vm, expected);
    }

    #[test]
    fn test_if_else_shape() {
        let vm = compile(
            "class A { function void f(int x) { var int y; \
             if (x > 0) { let y = 1; } else { let y = 2; } return; } }",
        );
        let expected = "function A.f 1\n\
                        push argument 0\n\
                        push constant 0\n\
                        gt\n\
                        not\n\
                        if-goto IF_FALSE_0\n\
                        push constant 1\n\
                        pop local 0\n\
                        goto IF_END_0\n\
                        label IF_FALSE_0\n\
                        push constant 2\n\
                        pop local 0\n\
                        label IF_END_0\n\
                        push constant 0\n\
                        return\n";
        assert_eq!(vm, expected);
    }

    #[test]
    fn test_string_literal_expansion() {
        let vm = compile("class A { function void f() { do Output.printString(\"Hi\"); return; } }");
        let expected = "function A.f 0\n\
                        push constant 2\n\
                        call String.new 1\n\
                        push constant 72\n\
                        call String.appendChar 2\n\
                        push constant 105\n\
                        call String.appendChar 2\n\
                        call Output.printString 1\n\
                        pop temp 0\n\
                        push constant 0\n\
                        return\n";
        assert_eq!(vm, expected);
    }

    #[test]
    fn test_while_shape() {
        let vm = compile(
            "class A { function void f() { var int i; while (i < 10) { let i = i + 1; } return; } }",
        );
        let expected = "function A.f 1\n\
                        label WHILE_EXP_0\n\
                        push local 0\n\
                        push constant 10\n\
                        lt\n\
                        not\n\
                        if-goto WHILE_END_0\n\
                        push local 0\n\
                        push constant 1\n\
                        add\n\
                        pop local 0\n\
                        goto WHILE_EXP_0\n\
                        label WHILE_END_0\n\
                        push constant 0\n\
                        return\n";
        assert_eq!(vm, expected);
    }

    #[test]
    fn test_labels_unique_within_subroutine() {
        let vm = compile(
            "class A { function void f(int x) { \
             if (x) { return; } if (x) { return; } while (x) { } return; } }",
        );
        let labels: Vec<&str> = vm
            .lines()
            .filter(|l| l.starts_with("label "))
            .collect();
        let mut deduped = labels.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(labels.len(), 6);
        assert_eq!(deduped.len(), 6);
    }

    #[test]
    fn test_label_counter_resets_per_subroutine() {
        let vm = compile(
            "class A { \
             function void f(int x) { if (x) { return; } return; } \
             function void g(int x) { if (x) { return; } return; } }",
        );
        assert_eq!(vm.matches("label IF_FALSE_0").count(), 2);
    }

    #[test]
    fn test_operators_apply_left_to_right() {
        // 2 + 3 * 4 is (2 + 3) * 4: no precedence
        let vm = compile("class A { function int f() { return 2 + 3 * 4; } }");
        let expected = "function A.f 0\n\
                        push constant 2\n\
                        push constant 3\n\
                        add\n\
                        push constant 4\n\
                        call Math.multiply 2\n\
                        return\n";
        assert_eq!(vm, expected);
    }

    #[test]
    fn test_parentheses_override_order() {
        let vm = compile("class A { function int f() { return 2 * (3 + 4); } }");
        let expected = "function A.f 0\n\
                        push constant 2\n\
                        push constant 3\n\
                        push constant 4\n\
                        add\n\
                        call Math.multiply 2\n\
                        return\n";
        assert_eq!(vm, expected);
    }

    #[test]
    fn test_keyword_constants() {
        let vm = compile(
            "class A { function void f() { var boolean b; \
             let b = true; let b = false; let b = null; return; } }",
        );
        let expected = "function A.f 1\n\
                        push constant 0\n\
                        not\n\
                        pop local 0\n\
                        push constant 0\n\
                        pop local 0\n\
                        push constant 0\n\
                        pop local 0\n\
                        push constant 0\n\
                        return\n";
        assert_eq!(vm, expected);
    }

    #[test]
    fn test_unary_operators() {
        let vm = compile("class A { function int f(int x) { return -x + ~x; } }");
        let expected = "function A.f 0\n\
                        push argument 0\n\
                        neg\n\
                        push argument 0\n\
                        not\n\
                        add\n\
                        return\n";
        assert_eq!(vm, expected);
    }

    #[test]
    fn test_do_discards_return_value() {
        let vm = compile("class A { function void f() { do Sys.halt(); return; } }");
        assert!(vm.contains("call Sys.halt 0\npop temp 0\n"));
    }

    #[test]
    fn test_same_class_call_passes_this() {
        let vm = compile(
            "class A { \
             method void f() { do g(); return; } \
             method void g() { return; } }",
        );
        assert!(vm.contains("push pointer 0\ncall A.g 1\npop temp 0\n"));
    }

    #[test]
    fn test_method_call_on_object_variable() {
        let vm = compile(
            "class A { function void f() { var Point p; do p.move(1, 2); return; } }",
        );
        let expected_call = "push local 0\n\
                             push constant 1\n\
                             push constant 2\n\
                             call Point.move 3\n\
                             pop temp 0\n";
        assert!(vm.contains(expected_call));
    }

    #[test]
    fn test_method_call_on_field_receiver() {
        let vm = compile(
            "class A { field Point p; method void f() { do p.draw(); return; } }",
        );
        assert!(vm.contains("push this 0\ncall Point.draw 1\npop temp 0\n"));
    }

    #[test]
    fn test_unknown_receiver_is_a_class_name() {
        let vm = compile("class A { function void f() { do Game.run(); return; } }");
        assert!(vm.contains("call Game.run 0\npop temp 0\n"));
    }

    #[test]
    fn test_static_variable_use() {
        let vm = compile(
            "class A { static int counter; \
             function void f() { let counter = counter + 1; return; } }",
        );
        assert!(vm.contains("push static 0\npush constant 1\nadd\npop static 0\n"));
    }

    #[test]
    fn test_field_shadowed_by_local() {
        let vm = compile(
            "class A { field int x; method int f() { var int x; let x = 5; return x; } }",
        );
        assert!(vm.contains("push constant 5\npop local 0\npush local 0\nreturn\n"));
    }

    #[test]
    fn test_array_read() {
        let vm = compile(
            "class A { function int f() { var Array a; return a[3]; } }",
        );
        let expected = "function A.f 1\n\
                        push local 0\n\
                        push constant 3\n\
                        add\n\
                        pop pointer 1\n\
                        push that 0\n\
                        return\n";
        assert_eq!(vm, expected);
    }

    #[test]
    fn test_constructor_must_return_this() {
        let err = compile_err(
            "class A { field int x; constructor A new() { return x; } }",
        );
        let message = err.to_string();
        assert!(message.contains("expected 'this'"));
        assert!(message.contains("found 'x'"));
    }

    #[test]
    fn test_constructor_bare_return_rejected() {
        let err = compile_err("class A { constructor A new() { return; } }");
        assert!(err.to_string().contains("expected 'this'"));
    }

    #[test]
    fn test_undefined_variable_in_let() {
        let err = compile_err("class A { function void f() { let x = 1; return; } }");
        assert!(err.to_string().contains("undefined variable 'x'"));
    }

    #[test]
    fn test_undefined_variable_in_term() {
        let err = compile_err("class A { function int f() { return y; } }");
        assert!(err.to_string().contains("undefined variable 'y'"));
    }

    #[test]
    fn test_duplicate_local_rejected() {
        let err = compile_err(
            "class A { function void f() { var int x; var char x; return; } }",
        );
        assert!(err.to_string().contains("already defined"));
    }

    #[test]
    fn test_error_carries_source_line() {
        let err = compile_err("class A {\n  function void f() {\n    let x = 1;\n  }\n}");
        assert!(err.to_string().starts_with("line 3:"));
    }

    #[test]
    fn test_missing_semicolon_is_syntax_error() {
        let err = compile_err("class A { function void f() { return } }");
        assert!(matches!(err, CompileError::Syntax { .. }));
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let err = compile_err("class A { } class B { }");
        assert!(err.to_string().contains("expected end of file"));
    }

    #[test]
    fn test_empty_class_compiles_to_nothing() {
        assert_eq!(compile("class A { }"), "");
    }

    #[test]
    fn test_multi_argument_call() {
        let vm = compile(
            "class A { function int f() { return Math.max(1, 2 + 3); } }",
        );
        let expected = "function A.f 0\n\
                        push constant 1\n\
                        push constant 2\n\
                        push constant 3\n\
                        add\n\
                        call Math.max 2\n\
                        return\n";
        assert_eq!(vm, expected);
    }

    #[test]
    fn test_integer_literal_round_trip() {
        for n in [0, 1, 7, 255, 16384, 32767] {
            let vm = compile(&format!(
                "class A {{ function int f() {{ return {}; }} }}",
                n
            ));
            assert_eq!(
                vm,
                format!("function A.f 0\npush constant {}\nreturn\n", n)
            );
        }
    }
}
