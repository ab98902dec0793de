//! The `@date` directive.
//!
//! `@date(as: DateFormatTypes, format: String, timezone: String)` renders a
//! `Timestamp` field as a string. async-graphql's dynamic schema cannot
//! declare custom executable directives, so the directive is handled around
//! execution instead:
//!
//! 1. [`PreparedQuery::prepare`] parses the query, records every field that
//!    carries `@date` and blanks the directive out of the query text (with
//!    spaces, so positions in error messages stay valid). Variable
//!    definitions only `@date` referenced are blanked too, otherwise the
//!    engine rejects them as unused.
//! 2. The stripped query is executed as usual.
//! 3. [`PreparedQuery::apply`] walks the response alongside the selection
//!    sets and formats the numeric values at each directed field.
//!
//! `format` wins over `as`; with neither, values are rendered as RFC 3339.
//! `timezone` accepts `UTC`, `Z`, `+HH:MM`, `-HH:MM` or `+HHMM` and defaults
//! to UTC.

use std::collections::{HashMap, HashSet};

use async_graphql::{Name, Pos, Response, ServerError, Value, Variables};
use async_graphql_parser::parse_query;
use async_graphql_parser::Positioned;
use async_graphql_parser::types::{
    Directive, DocumentOperations, ExecutableDocument, Field, OperationDefinition, Selection,
    SelectionSet,
};
use async_graphql_value::Value as InputValue;
use time::format_description::OwnedFormatItem;
use time::{OffsetDateTime, UtcOffset};
use tracing::trace;

use crate::registry::{TypeRegistry, named_type};
use crate::types::date_format::DateFormat;
use crate::types::scalars::TIMESTAMP;

/// Directive name constants.
pub mod names {
    pub const DATE: &str = "date";
    pub const INCLUDE: &str = "include";
    pub const SKIP: &str = "skip";
    pub const DEPRECATED: &str = "deprecated";
    pub const SPECIFIED_BY: &str = "specifiedBy";
    pub const ONE_OF: &str = "oneOf";
}

/// Every directive a schema supports, standard ones first.
pub const SUPPORTED_DIRECTIVES: [&str; 6] = [
    names::INCLUDE,
    names::SKIP,
    names::DEPRECATED,
    names::SPECIFIED_BY,
    names::ONE_OF,
    names::DATE,
];

/// SDL of the `@date` directive, appended to the schema SDL.
pub const DATE_DIRECTIVE_SDL: &str = r#"
"""
Render a Timestamp field as a formatted string.
`format` takes a format description such as "[year]-[month]-[day]" and
overrides `as`. `timezone` is a fixed offset such as "+02:00" or "UTC".
"""
directive @date(as: DateFormatTypes, format: String, timezone: String) on FIELD
"#;

/// How a directed field is rendered.
#[derive(Debug, Clone)]
enum Rendering {
    Named(DateFormat),
    Custom(OwnedFormatItem),
}

#[derive(Debug, Clone)]
struct DateArgs {
    rendering: Rendering,
    offset: UtcOffset,
}

impl DateArgs {
    fn format(&self, value: &Value) -> Result<Option<Value>, String> {
        let Value::Number(number) = value else {
            return Ok(None);
        };
        let seconds = number
            .as_i64()
            .or_else(|| number.as_f64().map(|f| f.trunc() as i64))
            .ok_or_else(|| format!("Invalid timestamp {number}"))?;
        let date = OffsetDateTime::from_unix_timestamp(seconds)
            .map_err(|e| format!("Invalid timestamp {seconds}: {e}"))?
            .to_offset(self.offset);

        let rendered = match &self.rendering {
            Rendering::Named(format) => format.format(date),
            Rendering::Custom(items) => date.format(items),
        }
        .map_err(|e| format!("Cannot format timestamp {seconds}: {e}"))?;
        Ok(Some(Value::String(rendered)))
    }
}

/// Parses a fixed UTC offset.
fn parse_timezone(value: &str) -> Option<UtcOffset> {
    if value.eq_ignore_ascii_case("utc") || value == "Z" {
        return Some(UtcOffset::UTC);
    }
    let (sign, rest) = match value.as_bytes().first()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return None,
    };
    if !rest.is_ascii() {
        return None;
    }
    let (hours, minutes) = match rest.len() {
        5 if rest.as_bytes()[2] == b':' => (&rest[..2], &rest[3..]),
        4 => (&rest[..2], &rest[2..]),
        2 => (rest, "00"),
        _ => return None,
    };
    let hours: i8 = hours.parse().ok()?;
    let minutes: i8 = minutes.parse().ok()?;
    UtcOffset::from_hms(sign * hours, sign * minutes, 0).ok()
}

fn string_argument(
    directive: &Directive,
    name: &str,
    variables: &Variables,
) -> Result<Option<String>, String> {
    let Some(argument) = directive.get_argument(name) else {
        return Ok(None);
    };
    let value = argument
        .node
        .clone()
        .into_const_with(|variable| {
            variables
                .get(&variable)
                .cloned()
                .ok_or_else(|| format!("Variable \"${variable}\" is not defined"))
        })?;
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Enum(name) => Ok(Some(name.to_string())),
        other => Err(format!("Invalid value {other} for @date argument \"{name}\"")),
    }
}

fn date_args(directive: &Directive, variables: &Variables) -> Result<DateArgs, String> {
    let rendering = match string_argument(directive, "format", variables)? {
        Some(format) => time::format_description::parse_owned::<1>(&format)
            .map(Rendering::Custom)
            .map_err(|e| format!("Invalid @date format \"{format}\": {e}"))?,
        None => match string_argument(directive, "as", variables)? {
            Some(name) => DateFormat::parse(&name)
                .map(Rendering::Named)
                .ok_or_else(|| format!("Unknown date format \"{name}\""))?,
            None => Rendering::Named(DateFormat::Rfc3339),
        },
    };
    let offset = match string_argument(directive, "timezone", variables)? {
        Some(timezone) => parse_timezone(&timezone)
            .ok_or_else(|| format!("Invalid @date timezone \"{timezone}\""))?,
        None => UtcOffset::UTC,
    };
    Ok(DateArgs { rendering, offset })
}

fn date_directive(field: &Field) -> Option<&Positioned<Directive>> {
    field
        .directives
        .iter()
        .find(|d| d.node.name.node.as_str() == names::DATE)
}

/// Character index of a parser position (1-based line and column).
fn char_index(chars: &[char], pos: Pos) -> Option<usize> {
    let mut line = 1;
    let mut line_start = 0;
    for (index, c) in chars.iter().enumerate() {
        if line == pos.line {
            break;
        }
        if *c == '\n' {
            line += 1;
            line_start = index + 1;
        }
    }
    (line == pos.line).then(|| line_start + pos.column.saturating_sub(1))
}

/// Blanks the directive starting at or after `start`: `@`, the name and an
/// optional parenthesized argument list. String literals are skipped when
/// looking for the closing parenthesis.
fn blank_directive(chars: &mut [char], start: usize) {
    let Some(at) = chars[start..].iter().position(|c| *c == '@').map(|i| start + i) else {
        return;
    };
    let mut end = at + 1;
    while end < chars.len() && chars[end].is_whitespace() {
        end += 1;
    }
    while end < chars.len() && (chars[end].is_alphanumeric() || chars[end] == '_') {
        end += 1;
    }

    let mut lookahead = end;
    while lookahead < chars.len() && (chars[lookahead].is_whitespace() || chars[lookahead] == ',') {
        lookahead += 1;
    }
    if lookahead < chars.len() && chars[lookahead] == '(' {
        let mut index = lookahead + 1;
        let mut in_string = false;
        while index < chars.len() {
            match chars[index] {
                '\\' if in_string => index += 1,
                '"' => in_string = !in_string,
                ')' if !in_string => break,
                _ => {}
            }
            index += 1;
        }
        end = (index + 1).min(chars.len());
    }

    blank_range(chars, at, end);
}

fn blank_range(chars: &mut [char], start: usize, end: usize) {
    for c in &mut chars[start..end] {
        if *c != '\n' && *c != '\r' {
            *c = ' ';
        }
    }
}

/// Index of the first `)` closing the current list, skipping strings and
/// nested brackets. With `stop_at_variable`, a `$` at the same level ends
/// the scan too.
fn scan_list_item(chars: &[char], start: usize, stop_at_variable: bool) -> usize {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut index = start;
    while index < chars.len() {
        let c = chars[index];
        if in_string {
            match c {
                '\\' => index += 1,
                '"' => in_string = false,
                _ => {}
            }
        } else {
            match c {
                '"' => in_string = true,
                '[' | '{' | '(' => depth += 1,
                ']' | '}' => depth = depth.saturating_sub(1),
                ')' if depth == 0 => return index,
                ')' => depth -= 1,
                '$' if stop_at_variable && depth == 0 => return index,
                _ => {}
            }
        }
        index += 1;
    }
    chars.len()
}

fn input_variables<'a>(value: &'a InputValue, out: &mut HashSet<&'a str>) {
    match value {
        InputValue::Variable(name) => {
            out.insert(name.as_str());
        }
        InputValue::List(items) => {
            for item in items {
                input_variables(item, out);
            }
        }
        InputValue::Object(fields) => {
            for value in fields.values() {
                input_variables(value, out);
            }
        }
        _ => {}
    }
}

fn directive_variables<'a>(directives: &'a [Positioned<Directive>], out: &mut HashSet<&'a str>) {
    for directive in directives {
        for (_, value) in &directive.node.arguments {
            input_variables(&value.node, out);
        }
    }
}

/// Variables referenced under `selection_set`, following fragment spreads.
fn selection_variables<'a>(
    document: &'a ExecutableDocument,
    selection_set: &'a SelectionSet,
    visited: &mut HashSet<&'a str>,
    out: &mut HashSet<&'a str>,
) {
    for selection in &selection_set.items {
        match &selection.node {
            Selection::Field(field) => {
                for (_, value) in &field.node.arguments {
                    input_variables(&value.node, out);
                }
                directive_variables(&field.node.directives, out);
                selection_variables(document, &field.node.selection_set.node, visited, out);
            }
            Selection::InlineFragment(fragment) => {
                directive_variables(&fragment.node.directives, out);
                selection_variables(document, &fragment.node.selection_set.node, visited, out);
            }
            Selection::FragmentSpread(spread) => {
                directive_variables(&spread.node.directives, out);
                let name = &spread.node.fragment_name.node;
                if visited.insert(name.as_str())
                    && let Some(fragment) = document.fragments.get(name)
                {
                    directive_variables(&fragment.node.directives, out);
                    selection_variables(document, &fragment.node.selection_set.node, visited, out);
                }
            }
        }
    }
}

/// Blanks the definitions of `date_variables` that the stripped query no
/// longer references. An emptied `(...)` list goes with them.
fn blank_unused_variables(chars: &mut [char], date_variables: &HashSet<String>) {
    if date_variables.is_empty() {
        return;
    }
    let stripped: String = chars.iter().collect();
    let Ok(document) = parse_query(&stripped) else {
        return;
    };

    for operation in operations(&document) {
        let mut used = HashSet::new();
        let mut visited = HashSet::new();
        directive_variables(&operation.directives, &mut used);
        selection_variables(&document, &operation.selection_set.node, &mut visited, &mut used);

        let definitions = &operation.variable_definitions;
        let unused: Vec<_> = definitions
            .iter()
            .filter(|definition| {
                let name = definition.node.name.node.as_str();
                date_variables.contains(name) && !used.contains(name)
            })
            .collect();
        if unused.is_empty() {
            continue;
        }

        if unused.len() == definitions.len() {
            // `()` does not parse, so the whole list goes.
            let Some(first) = char_index(chars, definitions[0].pos) else {
                continue;
            };
            let Some(open) = chars[..first].iter().rposition(|c| *c == '(') else {
                continue;
            };
            let close = scan_list_item(chars, open + 1, false);
            blank_range(chars, open, (close + 1).min(chars.len()));
            continue;
        }

        for definition in unused {
            let Some(start) = char_index(chars, definition.pos) else {
                continue;
            };
            let Some(dollar) = chars[start..].iter().position(|c| *c == '$').map(|i| start + i)
            else {
                continue;
            };
            let end = scan_list_item(chars, dollar + 1, true);
            blank_range(chars, dollar, end);
        }
    }
}

fn collect_fields<'a>(selection_set: &'a SelectionSet, fields: &mut Vec<&'a Field>) {
    for selection in &selection_set.items {
        match &selection.node {
            Selection::Field(field) => {
                fields.push(&field.node);
                collect_fields(&field.node.selection_set.node, fields);
            }
            Selection::InlineFragment(fragment) => {
                collect_fields(&fragment.node.selection_set.node, fields);
            }
            Selection::FragmentSpread(_) => {}
        }
    }
}

fn operations(document: &ExecutableDocument) -> Vec<&OperationDefinition> {
    match &document.operations {
        DocumentOperations::Single(operation) => vec![&operation.node],
        DocumentOperations::Multiple(operations) => {
            operations.values().map(|operation| &operation.node).collect()
        }
    }
}

/// A query with its `@date` directives removed.
#[derive(Debug)]
pub struct PreparedQuery {
    query: String,
    document: Option<ExecutableDocument>,
}

impl PreparedQuery {
    /// Strips `@date` from `query`.
    ///
    /// Queries that do not parse are returned unchanged so the engine can
    /// report the syntax error.
    #[must_use]
    pub fn prepare(query: &str) -> Self {
        let unchanged = || Self {
            query: query.to_string(),
            document: None,
        };
        if !query.contains("@date") {
            return unchanged();
        }
        let Ok(document) = parse_query(query) else {
            return unchanged();
        };

        let mut fields = Vec::new();
        for operation in operations(&document) {
            collect_fields(&operation.selection_set.node, &mut fields);
        }
        for fragment in document.fragments.values() {
            collect_fields(&fragment.node.selection_set.node, &mut fields);
        }

        let mut chars: Vec<char> = query.chars().collect();
        let mut found = 0;
        let mut date_variables = HashSet::new();
        for field in fields {
            if let Some(directive) = date_directive(field)
                && let Some(start) = char_index(&chars, directive.pos)
                && start < chars.len()
            {
                let mut referenced = HashSet::new();
                directive_variables(std::slice::from_ref(directive), &mut referenced);
                date_variables.extend(referenced.into_iter().map(str::to_string));

                blank_directive(&mut chars, start);
                found += 1;
            }
        }
        if found == 0 {
            return unchanged();
        }
        blank_unused_variables(&mut chars, &date_variables);
        trace!(
            count = found,
            variables = date_variables.len(),
            "Stripped @date directives"
        );

        Self {
            query: chars.into_iter().collect(),
            document: Some(document),
        }
    }

    /// The query to execute.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn has_dates(&self) -> bool {
        self.document.is_some()
    }

    /// Formats the directed fields of `response` in place.
    ///
    /// Argument errors are appended to the response errors once per
    /// directive; the affected values are left unchanged.
    pub fn apply(
        &self,
        response: &mut Response,
        registry: &TypeRegistry,
        operation_name: Option<&str>,
        variables: &Variables,
    ) {
        let Some(document) = &self.document else {
            return;
        };
        let operation = match (&document.operations, operation_name) {
            (DocumentOperations::Single(operation), _) => &operation.node,
            (DocumentOperations::Multiple(operations), Some(name)) => {
                match operations.get(&Name::new(name)) {
                    Some(operation) => &operation.node,
                    None => return,
                }
            }
            (DocumentOperations::Multiple(_), None) => return,
        };

        // The engine never saw the definitions blanked by `prepare`, so
        // their defaults are filled in here.
        let mut variables = variables.clone();
        for definition in &operation.variable_definitions {
            let definition = &definition.node;
            if let Some(default) = &definition.default_value
                && !variables.contains_key(&definition.name.node)
            {
                variables.insert(definition.name.node.clone(), default.node.clone());
            }
        }

        let mut applier = DateApplier {
            document,
            registry,
            variables: &variables,
            args: HashMap::new(),
            reported: HashSet::new(),
            errors: Vec::new(),
        };
        applier.walk(&operation.selection_set.node, Some("Query"), &mut response.data);
        response.errors.extend(applier.errors);
    }
}

struct DateApplier<'a> {
    document: &'a ExecutableDocument,
    registry: &'a TypeRegistry,
    variables: &'a Variables,
    args: HashMap<(usize, usize), Option<DateArgs>>,
    reported: HashSet<(usize, usize)>,
    errors: Vec<ServerError>,
}

impl DateApplier<'_> {
    fn report(&mut self, pos: Pos, message: String) {
        if self.reported.insert((pos.line, pos.column)) {
            self.errors.push(ServerError::new(message, Some(pos)));
        }
    }

    /// Named type of `field` on `parent`, if the registry knows it.
    fn field_type(&self, parent: Option<&str>, field: &str) -> Option<String> {
        let descriptor = self.registry.get_type(parent?)?;
        descriptor
            .fields()
            .iter()
            .find(|f| f.name == field)
            .map(|f| named_type(&f.ty).to_string())
    }

    fn args_for(&mut self, directive: &Directive, pos: Pos) -> Option<DateArgs> {
        let key = (pos.line, pos.column);
        if let Some(args) = self.args.get(&key) {
            return args.clone();
        }
        let args = match date_args(directive, self.variables) {
            Ok(args) => Some(args),
            Err(message) => {
                self.report(pos, message);
                None
            }
        };
        self.args.insert(key, args.clone());
        args
    }

    fn walk(&mut self, selection_set: &SelectionSet, parent: Option<&str>, data: &mut Value) {
        match data {
            Value::List(items) => {
                for item in items {
                    self.walk(selection_set, parent, item);
                }
            }
            Value::Object(_) => self.walk_object(selection_set, parent, data),
            _ => {}
        }
    }

    fn walk_object(&mut self, selection_set: &SelectionSet, parent: Option<&str>, data: &mut Value) {
        for selection in &selection_set.items {
            match &selection.node {
                Selection::Field(field) => {
                    let field = &field.node;
                    let Value::Object(object) = &mut *data else {
                        return;
                    };
                    let Some(value) = object.get_mut(&field.response_key().node) else {
                        continue;
                    };
                    let field_type = self.field_type(parent, field.name.node.as_str());

                    if let Some(directive) = date_directive(field) {
                        self.format_field(&directive.node, directive.pos, field_type.as_deref(), value);
                    }
                    if !field.selection_set.node.items.is_empty() {
                        self.walk(&field.selection_set.node, field_type.as_deref(), value);
                    }
                }
                Selection::InlineFragment(fragment) => {
                    let fragment = &fragment.node;
                    let parent = fragment
                        .type_condition
                        .as_ref()
                        .map(|condition| condition.node.on.node.as_str())
                        .or(parent);
                    self.walk_object(&fragment.selection_set.node, parent, data);
                }
                Selection::FragmentSpread(spread) => {
                    let document = self.document;
                    if let Some(fragment) = document.fragments.get(&spread.node.fragment_name.node) {
                        let parent = fragment.node.type_condition.node.on.node.as_str();
                        self.walk_object(&fragment.node.selection_set.node, Some(parent), data);
                    }
                }
            }
        }
    }

    fn format_field(
        &mut self,
        directive: &Directive,
        pos: Pos,
        field_type: Option<&str>,
        value: &mut Value,
    ) {
        if field_type.is_some_and(|ty| ty != TIMESTAMP) {
            self.report(pos, "@date can only be applied to Timestamp fields".to_string());
            return;
        }
        let Some(args) = self.args_for(directive, pos) else {
            return;
        };
        if let Err(message) = format_value(&args, value) {
            self.report(pos, message);
        }
    }
}

fn format_value(args: &DateArgs, value: &mut Value) -> Result<(), String> {
    if let Value::List(items) = value {
        for item in items {
            format_value(args, item)?;
        }
        return Ok(());
    }
    if let Some(formatted) = args.format(value)? {
        *value = formatted;
    }
    Ok(())
}
