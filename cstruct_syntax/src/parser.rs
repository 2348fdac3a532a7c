//! Recursive descent parser for C declarations
//!
//! ```text
//! translation_unit  ::= (directive | external_decl | ";")*
//! external_decl     ::= specifiers (declarator ("=" initializer)? ("," ...)*)? ";"
//!                     | specifiers declarator compound_statement
//! specifiers        ::= (storage | qualifier | attribute | "typedef" | type_specifier)+
//! type_specifier    ::= struct_or_union | enum | sized | primitive | type_identifier
//! struct_or_union   ::= ("struct" | "union") attribute* name? field_list?
//! declarator        ::= "*" qualifier* declarator | direct ("[" size? "]" | "(" params ")")*
//! direct            ::= identifier | "(" declarator ")"
//! ```
//!
//! Expressions (array sizes, bitfield widths, enumerator values,
//! initializers) are never evaluated; their token span is kept as one node.

use crate::error::ParseError;
use crate::lexer::{tokenize, Token, TokenKind};
use crate::tree::{Children, Field, NodeId, NodeKind, Span, SyntaxTree, TreeBuilder};

type PResult<T> = Result<T, ParseError>;

const STORAGE_CLASSES: &[&str] = &[
    "extern",
    "static",
    "auto",
    "register",
    "inline",
    "__inline",
    "__inline__",
    "__forceinline",
    "thread_local",
    "_Thread_local",
    "__thread",
    "_Noreturn",
    "noreturn",
    "constexpr",
    "__extension__",
];

const TYPE_QUALIFIERS: &[&str] = &[
    "const",
    "volatile",
    "restrict",
    "__restrict",
    "__restrict__",
    "_Atomic",
    "__const",
    "__volatile__",
    "_Nonnull",
    "_Nullable",
    "_Null_unspecified",
    "__unaligned",
];

const ATTRIBUTE_KEYWORDS: &[&str] = &[
    "__attribute__",
    "__attribute",
    "__declspec",
    "_Alignas",
    "alignas",
];

const ASM_KEYWORDS: &[&str] = &["asm", "__asm__", "__asm"];

const SIZE_MODIFIERS: &[&str] = &["signed", "unsigned", "long", "short"];

const SIZED_BASE_TYPES: &[&str] = &["int", "char", "double", "float"];

const PRIMITIVE_TYPES: &[&str] = &[
    "void",
    "char",
    "int",
    "float",
    "double",
    "bool",
    "_Bool",
    "_Complex",
    "__int128",
    "size_t",
    "ssize_t",
    "ptrdiff_t",
    "intptr_t",
    "uintptr_t",
    "charptr_t",
    "nullptr_t",
    "max_align_t",
    "int8_t",
    "int16_t",
    "int32_t",
    "int64_t",
    "uint8_t",
    "uint16_t",
    "uint32_t",
    "uint64_t",
    "char8_t",
    "char16_t",
    "char32_t",
    "char64_t",
];

const RESERVED: &[&str] = &[
    "typedef", "struct", "union", "enum", "if", "else", "while", "do", "for", "switch", "case",
    "default", "break", "continue", "return", "goto", "sizeof", "_Alignof", "alignof",
    "_Static_assert", "static_assert", "_Generic",
];

/* How a declarator's name leaf is labelled */
#[derive(Debug, Clone, Copy)]
enum NameKind {
    Plain,
    Field,
    Type,
}

impl NameKind {
    fn node_kind(self) -> NodeKind {
        match self {
            NameKind::Plain => NodeKind::Identifier,
            NameKind::Field => NodeKind::FieldIdentifier,
            NameKind::Type => NodeKind::TypeIdentifier,
        }
    }
}

struct DeclSpecs {
    children: Children,
    has_type: bool,
    is_typedef: bool,
}

#[derive(Clone, Copy)]
struct Mark {
    pos: usize,
    nodes: usize,
}

pub(crate) fn parse(source: String) -> SyntaxTree {
    let (tokens, errors) = tokenize(&source);
    let (builder, root, errors) = {
        let mut parser = Parser {
            src: &source,
            tokens,
            pos: 0,
            builder: TreeBuilder::default(),
            errors,
        };
        let root = parser.translation_unit();
        (parser.builder, root, parser.errors)
    };
    if !errors.is_empty() {
        tracing::debug!(count = errors.len(), "syntax errors recovered while parsing");
    }
    builder.finish(source, root, errors)
}

struct Parser<'s> {
    src: &'s str,
    tokens: Vec<Token>,
    pos: usize,
    builder: TreeBuilder,
    errors: Vec<ParseError>,
}

impl<'s> Parser<'s> {
    /* ----- token helpers ----- */

    fn peek(&self) -> Token {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> Token {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        self.tokens[idx]
    }

    fn text(&self, tok: Token) -> &'s str {
        &self.src[tok.span.start..tok.span.end]
    }

    fn is(&self, tok: Token, s: &str) -> bool {
        matches!(tok.kind, TokenKind::Ident | TokenKind::Punct) && self.text(tok) == s
    }

    fn at(&self, s: &str) -> bool {
        self.is(self.peek(), s)
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn at_word_in(&self, words: &[&str]) -> bool {
        let tok = self.peek();
        tok.kind == TokenKind::Ident && words.contains(&self.text(tok))
    }

    fn at_name(&self) -> bool {
        let tok = self.peek();
        tok.kind == TokenKind::Ident && !is_reserved(self.text(tok))
    }

    fn at_attribute(&self) -> bool {
        self.at_word_in(ATTRIBUTE_KEYWORDS) || (self.at("[") && self.is(self.peek_nth(1), "["))
    }

    fn bump(&mut self) -> Token {
        let tok = self.peek();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, s: &str) -> PResult<Token> {
        if self.at(s) {
            Ok(self.bump())
        } else {
            Err(self.error_here(format!("expected `{}`", s)))
        }
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        let tok = self.peek();
        let message = message.into();
        let found = match tok.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("`{}`", self.text(tok)),
        };
        ParseError::at(self.src, tok.span.start, format!("{}, found {}", message, found))
    }

    fn prev_end(&self) -> usize {
        if self.pos == 0 {
            0
        } else {
            self.tokens[self.pos - 1].span.end
        }
    }

    fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            nodes: self.builder.len(),
        }
    }

    fn rewind(&mut self, mark: Mark) {
        self.pos = mark.pos;
        self.builder.truncate(mark.nodes);
    }

    fn node(&mut self, kind: NodeKind, start: usize, children: Children) -> NodeId {
        let span = Span::new(start, self.prev_end().max(start));
        self.builder.push(kind, span, children)
    }

    fn leaf(&mut self, kind: NodeKind) -> NodeId {
        let tok = self.bump();
        self.builder.push(kind, tok.span, Vec::new())
    }

    fn is_opener(&self, tok: Token) -> bool {
        tok.kind == TokenKind::Punct && matches!(self.text(tok), "(" | "[" | "{")
    }

    fn is_closer(&self, tok: Token) -> bool {
        tok.kind == TokenKind::Punct && matches!(self.text(tok), ")" | "]" | "}")
    }

    /* Consume a bracketed group starting at the current opener */
    fn skip_balanced(&mut self) -> PResult<Span> {
        let open = self.peek();
        if !self.is_opener(open) {
            return Err(self.error_here("expected an opening bracket"));
        }
        let mut depth = 0usize;
        loop {
            let tok = self.peek();
            match tok.kind {
                TokenKind::Eof => {
                    return Err(ParseError::at(
                        self.src,
                        open.span.start,
                        format!("unclosed `{}`", self.text(open)),
                    ))
                }
                _ if self.is_opener(tok) => depth += 1,
                _ if self.is_closer(tok) => {
                    depth -= 1;
                    if depth == 0 {
                        self.bump();
                        return Ok(Span::new(open.span.start, tok.span.end));
                    }
                }
                _ => {}
            }
            self.bump();
        }
    }

    /* Consume tokens up to (not including) one of `stops` at bracket depth 0 */
    fn skip_until(&mut self, stops: &[&str]) -> Option<Span> {
        let start = self.peek().span.start;
        let first = self.pos;
        let mut depth = 0usize;
        loop {
            let tok = self.peek();
            if tok.kind == TokenKind::Eof || tok.kind == TokenKind::Directive {
                break;
            }
            if depth == 0 && (stops.iter().any(|s| self.is(tok, s)) || self.is_closer(tok)) {
                break;
            }
            if self.is_opener(tok) {
                depth += 1;
            } else if self.is_closer(tok) {
                depth -= 1;
            }
            self.bump();
        }
        (self.pos > first).then(|| Span::new(start, self.prev_end()))
    }

    fn expression_until(&mut self, stops: &[&str]) -> PResult<NodeId> {
        let first = self.pos;
        let Some(span) = self.skip_until(stops) else {
            return Err(self.error_here("expected expression"));
        };
        let kind = if self.pos - first == 1 {
            match self.tokens[first].kind {
                TokenKind::Number => NodeKind::NumberLiteral,
                TokenKind::Ident => NodeKind::Identifier,
                _ => NodeKind::Expression,
            }
        } else {
            NodeKind::Expression
        };
        Ok(self.builder.push(kind, span, Vec::new()))
    }

    /* ----- top level ----- */

    fn translation_unit(&mut self) -> NodeId {
        let mut children = Vec::new();
        while !self.at_eof() {
            if self.peek().kind == TokenKind::Directive {
                children.push((None, self.leaf(NodeKind::PreprocDirective)));
                continue;
            }
            if self.at(";") {
                self.bump();
                continue;
            }
            let mark = self.mark();
            match self.external_declaration() {
                Ok(id) => children.push((None, id)),
                Err(err) => {
                    self.errors.push(err);
                    self.rewind(mark);
                    let span = self.recover_top_level();
                    children.push((None, self.builder.push(NodeKind::Error, span, Vec::new())));
                }
            }
        }
        let span = Span::new(0, self.src.len());
        self.builder.push(NodeKind::TranslationUnit, span, children)
    }

    fn recover_top_level(&mut self) -> Span {
        let start = self.peek().span.start;
        let mut depth = 0usize;
        loop {
            let tok = self.peek();
            if tok.kind == TokenKind::Eof {
                break;
            }
            if tok.kind == TokenKind::Directive && depth == 0 && self.prev_end() > start {
                break;
            }
            self.bump();
            if self.is_opener(tok) {
                depth += 1;
            } else if self.is_closer(tok) {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                if depth == 0 && self.text(tok) == "}" {
                    if self.at(";") {
                        self.bump();
                    }
                    break;
                }
            } else if depth == 0 && self.is(tok, ";") {
                break;
            }
        }
        Span::new(start, self.prev_end().max(start))
    }

    fn external_declaration(&mut self) -> PResult<NodeId> {
        let start = self.peek().span.start;
        let specs = self.specifiers()?;
        let names = if specs.is_typedef {
            NameKind::Type
        } else {
            NameKind::Plain
        };
        let kind = if specs.is_typedef {
            NodeKind::TypeDefinition
        } else {
            NodeKind::Declaration
        };
        let mut children = specs.children;

        if self.at(";") {
            self.bump();
            return Ok(self.node(kind, start, children));
        }

        let mut first = true;
        loop {
            let decl_start = self.peek().span.start;
            let mut declarator = self.declarator(names)?;
            self.declarator_suffixes(&mut children)?;

            if first && !specs.is_typedef && self.at("{") {
                let body = self.skip_balanced()?;
                let body = self.builder.push(NodeKind::CompoundStatement, body, Vec::new());
                children.push((Some(Field::Declarator), declarator));
                children.push((Some(Field::Body), body));
                return Ok(self.node(NodeKind::FunctionDefinition, start, children));
            }

            if !specs.is_typedef && self.at("=") {
                self.bump();
                let value = self.initializer()?;
                declarator = self.node(
                    NodeKind::InitDeclarator,
                    decl_start,
                    vec![(Some(Field::Declarator), declarator), (Some(Field::Value), value)],
                );
            }
            children.push((Some(Field::Declarator), declarator));
            first = false;

            if self.at(",") {
                self.bump();
                continue;
            }
            break;
        }
        self.expect(";")?;
        Ok(self.node(kind, start, children))
    }

    /* Attributes and asm labels that may trail a declarator */
    fn declarator_suffixes(&mut self, children: &mut Children) -> PResult<()> {
        loop {
            if self.at_attribute() {
                let attr = self.attribute()?;
                children.push((None, attr));
            } else if self.at_word_in(ASM_KEYWORDS) {
                self.bump();
                self.skip_balanced()?;
            } else {
                return Ok(());
            }
        }
    }

    fn initializer(&mut self) -> PResult<NodeId> {
        match self.skip_until(&[",", ";"]) {
            Some(span) => Ok(self.builder.push(NodeKind::Initializer, span, Vec::new())),
            None => Err(self.error_here("expected initializer")),
        }
    }

    /* ----- specifiers ----- */

    fn specifiers(&mut self) -> PResult<DeclSpecs> {
        let mut specs = DeclSpecs {
            children: Vec::new(),
            has_type: false,
            is_typedef: false,
        };
        loop {
            if self.at_attribute() {
                let attr = self.attribute()?;
                specs.children.push((None, attr));
                continue;
            }
            let tok = self.peek();
            if tok.kind != TokenKind::Ident {
                break;
            }
            let word = self.text(tok);
            if word == "typedef" {
                self.bump();
                specs.is_typedef = true;
            } else if STORAGE_CLASSES.contains(&word) {
                let id = self.leaf(NodeKind::StorageClassSpecifier);
                specs.children.push((None, id));
            } else if TYPE_QUALIFIERS.contains(&word) {
                let id = self.leaf(NodeKind::TypeQualifier);
                specs.children.push((None, id));
            } else if specs.has_type {
                break;
            } else if word == "struct" || word == "union" {
                let id = self.struct_specifier()?;
                specs.children.push((Some(Field::Type), id));
                specs.has_type = true;
            } else if word == "enum" {
                let id = self.enum_specifier()?;
                specs.children.push((Some(Field::Type), id));
                specs.has_type = true;
            } else if SIZE_MODIFIERS.contains(&word) {
                let id = self.sized_type_specifier();
                specs.children.push((Some(Field::Type), id));
                specs.has_type = true;
            } else if PRIMITIVE_TYPES.contains(&word) {
                let id = self.leaf(NodeKind::PrimitiveType);
                specs.children.push((Some(Field::Type), id));
                specs.has_type = true;
            } else if !is_reserved(word) {
                let id = self.leaf(NodeKind::TypeIdentifier);
                specs.children.push((Some(Field::Type), id));
                specs.has_type = true;
            } else {
                break;
            }
        }
        if !specs.has_type {
            return Err(self.error_here("expected type specifier"));
        }
        Ok(specs)
    }

    fn sized_type_specifier(&mut self) -> NodeId {
        let start = self.peek().span.start;
        let mut children = Vec::new();
        loop {
            if self.at_word_in(SIZE_MODIFIERS) {
                self.bump();
            } else if children.is_empty() && self.at_word_in(SIZED_BASE_TYPES) {
                let id = self.leaf(NodeKind::PrimitiveType);
                children.push((Some(Field::Type), id));
            } else {
                break;
            }
        }
        self.node(NodeKind::SizedTypeSpecifier, start, children)
    }

    fn attribute(&mut self) -> PResult<NodeId> {
        let start = self.peek().span.start;
        if self.at("[") {
            self.skip_balanced()?;
            return Ok(self.node(NodeKind::AttributeDeclaration, start, Vec::new()));
        }
        self.bump();
        if self.at("(") {
            self.skip_balanced()?;
        }
        Ok(self.node(NodeKind::AttributeSpecifier, start, Vec::new()))
    }

    fn struct_specifier(&mut self) -> PResult<NodeId> {
        let keyword = self.bump();
        let kind = if self.text(keyword) == "union" {
            NodeKind::UnionSpecifier
        } else {
            NodeKind::StructSpecifier
        };
        let mut children = Vec::new();
        while self.at_attribute() {
            let attr = self.attribute()?;
            children.push((None, attr));
        }
        let mut named = false;
        if self.at_name() {
            let name = self.leaf(NodeKind::TypeIdentifier);
            children.push((Some(Field::Name), name));
            named = true;
        }
        let mut has_body = false;
        if self.at("{") {
            let body = self.field_declaration_list()?;
            children.push((Some(Field::Body), body));
            has_body = true;
        }
        if !named && !has_body {
            return Err(self.error_here(format!(
                "expected {} name or body",
                self.text(keyword)
            )));
        }
        if has_body {
            while self.at_word_in(ATTRIBUTE_KEYWORDS) {
                let attr = self.attribute()?;
                children.push((None, attr));
            }
        }
        Ok(self.node(kind, keyword.span.start, children))
    }

    fn field_declaration_list(&mut self) -> PResult<NodeId> {
        let open = self.expect("{")?;
        let mut children = Vec::new();
        loop {
            if self.at("}") {
                self.bump();
                break;
            }
            match self.peek().kind {
                TokenKind::Eof => {
                    return Err(ParseError::at(self.src, open.span.start, "unclosed `{`"))
                }
                TokenKind::Directive => {
                    children.push((None, self.leaf(NodeKind::PreprocDirective)));
                    continue;
                }
                _ => {}
            }
            if self.at(";") {
                self.bump();
                continue;
            }
            let mark = self.mark();
            match self.field_declaration() {
                Ok(id) => children.push((None, id)),
                Err(err) => {
                    self.errors.push(err);
                    self.rewind(mark);
                    let span = self.recover_in_block(mark);
                    children.push((None, self.builder.push(NodeKind::Error, span, Vec::new())));
                }
            }
        }
        Ok(self.node(NodeKind::FieldDeclarationList, open.span.start, children))
    }

    /* Skip to the end of the current member; stops before a closing `}` */
    fn recover_in_block(&mut self, mark: Mark) -> Span {
        let start = self.peek().span.start;
        self.skip_until(&[";"]);
        if self.at(";") {
            self.bump();
        }
        if self.pos == mark.pos && !self.at("}") && !self.at_eof() {
            self.bump();
        }
        Span::new(start, self.prev_end().max(start))
    }

    fn field_declaration(&mut self) -> PResult<NodeId> {
        let start = self.peek().span.start;
        let specs = self.specifiers()?;
        let mut children = specs.children;
        if !self.at(";") {
            loop {
                if !self.at(":") {
                    let declarator = self.declarator(NameKind::Field)?;
                    children.push((Some(Field::Declarator), declarator));
                    self.declarator_suffixes(&mut children)?;
                }
                if self.at(":") {
                    let clause = self.bitfield_clause()?;
                    children.push((None, clause));
                    self.declarator_suffixes(&mut children)?;
                }
                if self.at(",") {
                    self.bump();
                    continue;
                }
                break;
            }
        }
        self.expect(";")?;
        Ok(self.node(NodeKind::FieldDeclaration, start, children))
    }

    fn bitfield_clause(&mut self) -> PResult<NodeId> {
        let colon = self.bump();
        let width = self.expression_until(&[",", ";"])?;
        Ok(self.node(NodeKind::BitfieldClause, colon.span.start, vec![(None, width)]))
    }

    fn enum_specifier(&mut self) -> PResult<NodeId> {
        let keyword = self.bump();
        let mut children = Vec::new();
        if self.at_word_in(&["class", "struct"]) {
            self.bump();
        }
        while self.at_attribute() {
            let attr = self.attribute()?;
            children.push((None, attr));
        }
        let mut named = false;
        if self.at_name() {
            let name = self.leaf(NodeKind::TypeIdentifier);
            children.push((Some(Field::Name), name));
            named = true;
        }
        if self.at(":") {
            self.bump();
            let underlying = self.specifiers()?;
            for (field, id) in underlying.children {
                let field = field.map(|f| match f {
                    Field::Type => Field::Underlying,
                    other => other,
                });
                children.push((field, id));
            }
        }
        let mut has_body = false;
        if self.at("{") {
            let body = self.enumerator_list()?;
            children.push((Some(Field::Body), body));
            has_body = true;
        }
        if !named && !has_body {
            return Err(self.error_here("expected enum name or body"));
        }
        Ok(self.node(NodeKind::EnumSpecifier, keyword.span.start, children))
    }

    fn enumerator_list(&mut self) -> PResult<NodeId> {
        let open = self.expect("{")?;
        let mut children = Vec::new();
        loop {
            if self.at("}") {
                self.bump();
                break;
            }
            if self.at(",") {
                self.bump();
                continue;
            }
            match self.peek().kind {
                TokenKind::Eof => {
                    return Err(ParseError::at(self.src, open.span.start, "unclosed `{`"))
                }
                TokenKind::Directive => {
                    children.push((None, self.leaf(NodeKind::PreprocDirective)));
                    continue;
                }
                _ => {}
            }
            if !self.at_name() {
                return Err(self.error_here("expected enumerator"));
            }
            let start = self.peek().span.start;
            let mut enumerator = vec![(Some(Field::Name), self.leaf(NodeKind::Identifier))];
            while self.at_attribute() {
                let attr = self.attribute()?;
                enumerator.push((None, attr));
            }
            if self.at("=") {
                self.bump();
                let value = self.expression_until(&[",", "}"])?;
                enumerator.push((Some(Field::Value), value));
            }
            children.push((None, self.node(NodeKind::Enumerator, start, enumerator)));
        }
        Ok(self.node(NodeKind::EnumeratorList, open.span.start, children))
    }

    /* ----- declarators ----- */

    fn declarator(&mut self, names: NameKind) -> PResult<NodeId> {
        let start = self.peek().span.start;
        if self.at("*") {
            self.bump();
            let mut children = Vec::new();
            loop {
                if self.at_word_in(TYPE_QUALIFIERS) {
                    children.push((None, self.leaf(NodeKind::TypeQualifier)));
                } else if self.at_word_in(ATTRIBUTE_KEYWORDS) {
                    let attr = self.attribute()?;
                    children.push((None, attr));
                } else {
                    break;
                }
            }
            let inner = self.declarator(names)?;
            children.push((Some(Field::Declarator), inner));
            return Ok(self.node(NodeKind::PointerDeclarator, start, children));
        }

        let mut base = if self.at("(") {
            self.bump();
            while self.at_word_in(ATTRIBUTE_KEYWORDS) {
                self.attribute()?;
            }
            let inner = self.declarator(names)?;
            self.expect(")")?;
            self.node(NodeKind::ParenthesizedDeclarator, start, vec![(None, inner)])
        } else if self.at_name() && !self.at_word_in(TYPE_QUALIFIERS) {
            self.leaf(names.node_kind())
        } else {
            return Err(self.error_here("expected declarator"));
        };

        loop {
            if self.at("[") && self.is(self.peek_nth(1), "[") {
                let attr = self.attribute()?;
                base = self.node(
                    NodeKind::AttributedDeclarator,
                    start,
                    vec![(None, base), (None, attr)],
                );
            } else if self.at("[") {
                self.bump();
                let mut children = vec![(Some(Field::Declarator), base)];
                while self.at_word_in(&["static", "const", "volatile", "restrict"]) {
                    self.bump();
                }
                if !self.at("]") {
                    let size = self.expression_until(&["]"])?;
                    children.push((Some(Field::Size), size));
                }
                self.expect("]")?;
                base = self.node(NodeKind::ArrayDeclarator, start, children);
            } else if self.at("(") {
                let params = self.skip_balanced()?;
                let params = self.builder.push(NodeKind::ParameterList, params, Vec::new());
                base = self.node(
                    NodeKind::FunctionDeclarator,
                    start,
                    vec![(Some(Field::Declarator), base), (Some(Field::Parameters), params)],
                );
            } else {
                return Ok(base);
            }
        }
    }
}

fn is_reserved(word: &str) -> bool {
    RESERVED.contains(&word)
}
