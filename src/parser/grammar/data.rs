//! `DEFINE DATA … END-DEFINE`.
//!
//! Definitions arrive as a flat sequence of level-numbered lines; nesting is
//! rebuilt from the level numbers. A child must be exactly one level deeper
//! than its parent.

use smol_str::SmolStr;

use super::identifier;
use crate::base::TextSize;
use crate::parser::parser::{ParseResult, Parser, SyntaxError};
use crate::parser::syntax_kind::SyntaxKind;
use crate::syntax::ast::{
    ArrayDimension, DataBlock, DataFormat, DataItem, DataType, DefineData, DimensionBound,
    Expression, GroupDeclaration, Initializer, InitializerKind, ParameterMode, Redefinition,
    VariableDeclaration, VariableReference, ViewDeclaration, ViewField,
};

/// Level-numbered item header, before its members are known.
enum ItemHead {
    Typed {
        data_type: DataType,
        dimensions: Vec<ArrayDimension>,
    },
    Untyped {
        dimensions: Vec<ArrayDimension>,
    },
}

impl Parser<'_, '_> {
    /// Parses `DEFINE DATA … END-DEFINE`. Problems inside are reported and
    /// skipped line by line; the section itself always produces a node.
    pub(super) fn parse_define_data(&mut self) -> DefineData {
        let start = self.advance().range.start();
        self.advance();

        let mut blocks = Vec::new();
        while !self.at(SyntaxKind::END_DEFINE) && !self.at_end() {
            let start_pos = self.position();
            if self.kind().is_scope_keyword() {
                match self.parse_data_block() {
                    Ok(block) => blocks.push(block),
                    Err(error) => self.skip_definition_line(start_pos, error),
                }
            } else {
                let error = self.unexpected("LOCAL, GLOBAL, PARAMETER or INDEPENDENT");
                self.skip_definition_line(start_pos, error);
            }
        }
        if self.eat(SyntaxKind::END_DEFINE).is_none() {
            self.report(self.unexpected("END-DEFINE"));
        }

        DefineData {
            blocks,
            range: self.finish(start),
        }
    }

    /// Recovery inside `DEFINE DATA`: skip to the next level number or
    /// scope keyword that starts a line. At least one token is consumed
    /// unless the failed item already moved onto the next line.
    fn skip_definition_line(&mut self, start_pos: usize, error: SyntaxError) {
        let start = self.offset_of(start_pos);
        let moved_on = self.position() > start_pos && self.at_definition_line_start();
        if !moved_on && !self.at(SyntaxKind::END_DEFINE) {
            self.advance();
        }
        while !self.at_end()
            && !self.at(SyntaxKind::END_DEFINE)
            && !self.at_definition_line_start()
        {
            self.advance();
        }
        self.report(SyntaxError::new(error.message, self.finish(start)));
    }

    fn at_definition_line_start(&self) -> bool {
        self.is_first_on_line(0) && (self.at(SyntaxKind::NUMBER) || self.kind().is_scope_keyword())
    }

    fn parse_data_block(&mut self) -> ParseResult<DataBlock> {
        let scope_token = self.advance();
        let start = scope_token.range.start();

        let using = if self.eat(SyntaxKind::USING).is_some() {
            let name = identifier(&self.expect_name(true)?);
            if self.eat(SyntaxKind::WITH).is_some() {
                self.expect_name(true)?;
            }
            Some(name)
        } else {
            None
        };

        let items = self.parse_data_items(0);
        Ok(DataBlock {
            scope_token: scope_token.kind,
            scope: None,
            using,
            items,
            range: self.finish(start),
        })
    }

    fn at_level_number(&self) -> bool {
        self.at(SyntaxKind::NUMBER) && !self.current().text.contains('.')
    }

    fn current_level(&self) -> Option<u8> {
        self.current().text.parse().ok()
    }

    /// Items deeper than `parent_level`. Errors inside one item are
    /// reported and that line is skipped.
    fn parse_data_items(&mut self, parent_level: u8) -> Vec<DataItem> {
        let mut items = Vec::new();
        while self.at_level_number() {
            let start_pos = self.position();
            let Some(level) = self.current_level() else {
                let error = self.unexpected("a level number");
                self.skip_definition_line(start_pos, error);
                continue;
            };
            if level <= parent_level {
                break;
            }
            if level != parent_level.saturating_add(1) {
                self.report(SyntaxError::new(
                    format!(
                        "level {level} does not follow level {parent_level}; expected level {}",
                        parent_level.saturating_add(1)
                    ),
                    self.current().range,
                ));
            }
            match self.parse_data_item(level) {
                Ok(item) => items.push(item),
                Err(error) => self.skip_definition_line(start_pos, error),
            }
        }
        items
    }

    fn parse_data_item(&mut self, level: u8) -> ParseResult<DataItem> {
        let start = self.advance().range.start();

        if self.eat(SyntaxKind::REDEFINE).is_some() {
            let name = identifier(&self.expect_name(true)?);
            let target = VariableReference::simple(name);
            let members = self.parse_data_items(level);
            return Ok(DataItem::Redefine(Redefinition {
                level,
                target,
                members,
                range: self.finish(start),
            }));
        }

        let name = identifier(&self.expect_name(true)?);

        if self.eat(SyntaxKind::VIEW).is_some() {
            self.eat(SyntaxKind::OF);
            let ddm = identifier(&self.expect_name(true)?);
            let fields = self.parse_view_fields(level)?;
            return Ok(DataItem::View(ViewDeclaration {
                level,
                name,
                ddm,
                fields,
                scope: None,
                range: self.finish(start),
            }));
        }

        match self.parse_item_head()? {
            ItemHead::Typed {
                data_type,
                dimensions,
            } => {
                let mut data_type = data_type;
                if self.eat(SyntaxKind::DYNAMIC).is_some() {
                    data_type.dynamic = true;
                }
                if data_type.length.is_none()
                    && !data_type.dynamic
                    && !data_type.format.has_fixed_length()
                {
                    self.report(SyntaxError::new(
                        format!("format {} needs a length or DYNAMIC", data_type.format.letter()),
                        data_type.range,
                    ));
                }
                let (initializer, parameter_mode, optional) = self.parse_declaration_tail()?;
                Ok(DataItem::Variable(VariableDeclaration {
                    level,
                    name,
                    data_type,
                    dimensions,
                    initializer,
                    parameter_mode,
                    optional,
                    scope: None,
                    range: self.finish(start),
                }))
            }
            ItemHead::Untyped { dimensions } => {
                let header_end = self.finish(start);
                let members = self.parse_data_items(level);
                if members.is_empty() {
                    self.report(SyntaxError::new(
                        format!("'{}' has neither a format nor members", name.name),
                        header_end,
                    ));
                }
                Ok(DataItem::Group(GroupDeclaration {
                    level,
                    name,
                    dimensions,
                    members,
                    scope: None,
                    range: self.finish(start),
                }))
            }
        }
    }

    /// `(A10)`, `(N7,2/1:10)`, `(1:5)` or nothing.
    fn parse_item_head(&mut self) -> ParseResult<ItemHead> {
        if !self.at(SyntaxKind::LPAREN) {
            return Ok(ItemHead::Untyped {
                dimensions: Vec::new(),
            });
        }
        let open = self.advance();

        if !self.at(SyntaxKind::IDENT) {
            let dimensions = self.parse_dimensions()?;
            self.expect(SyntaxKind::RPAREN)?;
            return Ok(ItemHead::Untyped { dimensions });
        }

        let data_type = self.parse_data_type()?;
        let dimensions = if self.eat(SyntaxKind::SLASH).is_some() {
            self.parse_dimensions()?
        } else {
            Vec::new()
        };
        self.expect(SyntaxKind::RPAREN)?;
        Ok(ItemHead::Typed {
            data_type: DataType {
                range: self.finish(open.range.start()),
                ..data_type
            },
            dimensions,
        })
    }

    /// `A10`, `N7,2`, `N7.2`, `L`, `A`.
    fn parse_data_type(&mut self) -> ParseResult<DataType> {
        let token = self.expect(SyntaxKind::IDENT)?;
        let mut chars = token.text.chars();
        let format = chars
            .next()
            .and_then(DataFormat::from_letter)
            .ok_or_else(|| {
                SyntaxError::new(format!("unknown format '{}'", token.text), token.range)
            })?;
        let digits = chars.as_str();
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SyntaxError::new(
                format!("invalid length in '{}'", token.text),
                token.range,
            ));
        }

        let mut length = (!digits.is_empty()).then(|| digits.to_string());
        let has_decimals = matches!(self.kind(), SyntaxKind::COMMA | SyntaxKind::DOT)
            && self.peek_kind(1) == SyntaxKind::NUMBER
            && self.adjacent(0);
        if has_decimals {
            let separator = self.advance();
            let decimals = self.advance();
            let whole = length.get_or_insert_with(String::new);
            whole.push_str(separator.text);
            whole.push_str(decimals.text);
        }

        Ok(DataType {
            format,
            length: length.map(SmolStr::new),
            dynamic: false,
            range: self.finish(token.range.start()),
        })
    }

    /// `1:10`, `10`, `*`, `1:V`, comma-separated.
    fn parse_dimensions(&mut self) -> ParseResult<Vec<ArrayDimension>> {
        let mut dimensions = Vec::new();
        loop {
            let start = self.current().range.start();
            let first = self.parse_dimension_bound()?;
            let dimension = if self.eat(SyntaxKind::COLON).is_some() {
                let upper = self.parse_dimension_bound()?;
                ArrayDimension {
                    lower: Some(first),
                    upper,
                    range: self.finish(start),
                }
            } else {
                ArrayDimension {
                    lower: None,
                    upper: first,
                    range: self.finish(start),
                }
            };
            dimensions.push(dimension);
            if self.eat(SyntaxKind::COMMA).is_none() {
                break;
            }
        }
        Ok(dimensions)
    }

    fn parse_dimension_bound(&mut self) -> ParseResult<DimensionBound> {
        match self.kind() {
            SyntaxKind::NUMBER => Ok(DimensionBound::Number(SmolStr::new(self.advance().text))),
            SyntaxKind::ASTERISK => {
                self.advance();
                Ok(DimensionBound::Unbounded)
            }
            kind if kind.can_be_name() => Ok(DimensionBound::Name(identifier(&self.advance()))),
            _ => Err(self.unexpected("an array bound")),
        }
    }

    /// `INIT <…>`, `CONST <…>`, `BY VALUE [RESULT]`, `OPTIONAL` in any order.
    fn parse_declaration_tail(
        &mut self,
    ) -> ParseResult<(Option<Initializer>, ParameterMode, bool)> {
        let mut initializer = None;
        let mut mode = ParameterMode::ByReference;
        let mut optional = false;
        loop {
            match self.kind() {
                SyntaxKind::INIT | SyntaxKind::CONST if initializer.is_none() => {
                    initializer = Some(self.parse_initializer()?);
                }
                SyntaxKind::BY => {
                    self.advance();
                    self.expect(SyntaxKind::VALUE)?;
                    mode = if self.eat(SyntaxKind::RESULT).is_some() {
                        ParameterMode::ByValueResult
                    } else {
                        ParameterMode::ByValue
                    };
                }
                SyntaxKind::OPTIONAL => {
                    self.advance();
                    optional = true;
                }
                _ => break,
            }
        }
        Ok((initializer, mode, optional))
    }

    fn parse_initializer(&mut self) -> ParseResult<Initializer> {
        let keyword = self.advance();
        let kind = match keyword.kind {
            SyntaxKind::CONST => InitializerKind::Const,
            _ if self.eat(SyntaxKind::ALL).is_some() => InitializerKind::InitAll,
            _ => InitializerKind::Init,
        };
        self.expect(SyntaxKind::LESS)?;
        let mut values = Vec::new();
        loop {
            values.push(Expression::Operand(self.parse_operand()?));
            if self.eat(SyntaxKind::COMMA).is_none() {
                break;
            }
        }
        self.expect(SyntaxKind::GREATER)?;
        Ok(Initializer {
            kind,
            values,
            range: self.finish(keyword.range.start()),
        })
    }

    /// Fields of a view: everything deeper than the view's level.
    fn parse_view_fields(&mut self, view_level: u8) -> ParseResult<Vec<ViewField>> {
        let mut fields = Vec::new();
        while self.at_level_number() {
            let Some(level) = self.current_level() else {
                break;
            };
            if level <= view_level {
                break;
            }
            let start: TextSize = self.advance().range.start();
            let name = identifier(&self.expect_name(true)?);
            let (data_type, dimensions) = match self.parse_item_head()? {
                ItemHead::Typed {
                    data_type,
                    dimensions,
                } => (Some(data_type), dimensions),
                ItemHead::Untyped { dimensions } => (None, dimensions),
            };
            fields.push(ViewField {
                level,
                name,
                data_type,
                dimensions,
                range: self.finish(start),
            });
        }
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;
    use crate::parser::syntax_kind::SyntaxKind;
    use crate::syntax::ast::*;

    const SOURCE: &str = "\
DEFINE DATA
  PARAMETER
  1 #P-IN (A10) BY VALUE
  1 #P-OPT (N7,2) OPTIONAL
  LOCAL USING MYLDA
  LOCAL
  1 #NAME (A20) INIT <'X'>
  1 #COUNT (I4) CONST <-5>
  1 #TEXT (A) DYNAMIC
  1 #ARR (N7.2/1:10,*)
  1 #GRP
    2 #INNER (L)
    2 #SUB (1:3)
      3 #LEAF (D)
  1 #RAW (A8)
  1 REDEFINE #RAW
    2 #YEAR (N4)
  1 EMP VIEW OF EMPLOYEES
    2 NAME
    2 SALARY (P9/1:5)
  INDEPENDENT
  1 +GLOBAL-FLAG (L)
END-DEFINE
END
";

    fn define_data() -> DefineData {
        let parse = parse(SOURCE, UnitKind::Program);
        assert!(parse.diagnostics.is_empty(), "{:?}", parse.diagnostics);
        parse.unit.define_data.expect("DEFINE DATA")
    }

    #[test]
    fn test_blocks_in_source_order() {
        let data = define_data();
        let scopes: Vec<SyntaxKind> = data.blocks.iter().map(|b| b.scope_token).collect();
        assert_eq!(
            scopes,
            [
                SyntaxKind::PARAMETER,
                SyntaxKind::LOCAL,
                SyntaxKind::LOCAL,
                SyntaxKind::INDEPENDENT
            ]
        );
        assert_eq!(data.blocks[1].using.as_ref().map(|u| u.name.as_str()), Some("MYLDA"));
    }

    #[test]
    fn test_parameter_modes() {
        let data = define_data();
        let DataItem::Variable(by_value) = &data.blocks[0].items[0] else {
            panic!("expected variable");
        };
        assert_eq!(by_value.parameter_mode, ParameterMode::ByValue);
        let DataItem::Variable(optional) = &data.blocks[0].items[1] else {
            panic!("expected variable");
        };
        assert!(optional.optional);
        assert_eq!(optional.data_type.length.as_deref(), Some("7,2"));
    }

    #[test]
    fn test_local_items_and_nesting() {
        let data = define_data();
        let items = &data.blocks[2].items;
        assert_eq!(items.len(), 8);

        let DataItem::Variable(count) = &items[1] else {
            panic!("expected variable");
        };
        let init = count.initializer.as_ref().expect("initializer");
        assert_eq!(init.kind, InitializerKind::Const);
        assert!(matches!(
            &init.values[0],
            Expression::Operand(Operand::Literal(l)) if l.text == "-5"
        ));

        let DataItem::Variable(arr) = &items[3] else {
            panic!("expected variable");
        };
        assert_eq!(arr.data_type.length.as_deref(), Some("7.2"));
        assert_eq!(arr.dimensions.len(), 2);
        assert_eq!(arr.dimensions[1].upper, DimensionBound::Unbounded);

        let DataItem::Group(group) = &items[4] else {
            panic!("expected group");
        };
        assert_eq!(group.members.len(), 2);
        let DataItem::Group(sub) = &group.members[1] else {
            panic!("expected nested group");
        };
        assert_eq!(sub.dimensions.len(), 1);
        assert_eq!(sub.members.len(), 1);

        assert!(matches!(&items[6], DataItem::Redefine(r) if r.members.len() == 1));
        let DataItem::View(view) = &items[7] else {
            panic!("expected view");
        };
        assert_eq!(view.ddm.name, "EMPLOYEES");
        assert_eq!(view.fields.len(), 2);
        assert!(view.fields[0].data_type.is_none());
    }

    #[test]
    fn test_level_jump_is_reported() {
        let parse = parse(
            "DEFINE DATA LOCAL\n1 #GRP\n3 #DEEP (A1)\nEND-DEFINE\nEND",
            UnitKind::Program,
        );
        assert_eq!(parse.diagnostics.len(), 1, "{:?}", parse.diagnostics);
        assert!(parse.diagnostics[0].message.contains("level 3"));
    }

    #[test]
    fn test_data_area_rejects_statements() {
        let parse = parse(
            "DEFINE DATA LOCAL\n1 #A (A1)\nEND-DEFINE\nWRITE #A",
            UnitKind::DataArea(DataAreaKind::Local),
        );
        assert!(parse.unit.body.is_empty());
        assert_eq!(parse.diagnostics.len(), 1);
    }

    #[test]
    fn test_bad_definition_line_is_skipped() {
        let parse = parse(
            "DEFINE DATA LOCAL\n1 #A (Q5)\n1 #B (A1)\nEND-DEFINE\nEND",
            UnitKind::Program,
        );
        assert_eq!(parse.diagnostics.len(), 1);
        let data = parse.unit.define_data.expect("DEFINE DATA");
        assert_eq!(data.blocks[0].items.len(), 1);
    }
}
