//! Output and input element lists, attribute lists and module parameters.

use smol_str::SmolStr;

use crate::base::TextSize;
use crate::parser::parser::{ParseResult, Parser};
use crate::parser::syntax_kind::SyntaxKind;
use crate::syntax::ast::{
    Attribute, AttributeList, InputStatement, ModuleParameter, OperandElement, OutputElement,
    OutputKind, OutputStatement, Positioning, PositioningKind, Statement, TextElement,
};

impl Parser<'_, '_> {
    /// `WRITE`/`DISPLAY`/`PRINT [NOTITLE] [NOHDR] [(attrs)] elements…`
    pub(super) fn parse_output_statement(&mut self, start: TextSize) -> ParseResult<Statement> {
        let kind = match self.advance().kind {
            SyntaxKind::DISPLAY => OutputKind::Display,
            SyntaxKind::PRINT => OutputKind::Print,
            _ => OutputKind::Write,
        };

        let mut no_title = false;
        let mut no_header = false;
        let mut statement_attributes = None;
        loop {
            if self.eat(SyntaxKind::NOTITLE).is_some() {
                no_title = true;
            } else if self.eat(SyntaxKind::NOHDR).is_some() {
                no_header = true;
            } else if self.at_attribute_list() && statement_attributes.is_none() {
                statement_attributes = Some(self.parse_attribute_list()?);
            } else {
                break;
            }
        }

        let elements = self.parse_output_elements()?;
        Ok(Statement::Output(OutputStatement {
            kind,
            statement_attributes,
            no_title,
            no_header,
            elements,
            range: self.finish(start),
        }))
    }

    /// `INPUT [(attrs)] [USING MAP 'name'] elements…`
    pub(super) fn parse_input_statement(&mut self, start: TextSize) -> ParseResult<Statement> {
        self.expect(SyntaxKind::INPUT)?;
        let statement_attributes = if self.at_attribute_list() {
            Some(self.parse_attribute_list()?)
        } else {
            None
        };

        let map = if self.eat(SyntaxKind::USING).is_some() {
            self.expect(SyntaxKind::MAP)?;
            if !self.at(SyntaxKind::STRING) {
                return Err(self.unexpected("a map name literal"));
            }
            Some(self.parse_literal()?)
        } else {
            None
        };

        let elements = self.parse_output_elements()?;
        Ok(Statement::Input(InputStatement {
            statement_attributes,
            map,
            elements,
            range: self.finish(start),
        }))
    }

    /// Elements up to the next statement boundary.
    fn parse_output_elements(&mut self) -> ParseResult<Vec<OutputElement>> {
        let mut elements = Vec::new();
        while !self.at_element_list_end() {
            let element = match self.kind() {
                SyntaxKind::SLASH => self.positioning(PositioningKind::NewLine),
                SyntaxKind::SPACING => self.positioning(PositioningKind::Spacing),
                SyntaxKind::TABULATION => self.positioning(PositioningKind::Tabulation),
                SyntaxKind::STRING => OutputElement::Text(self.parse_text_element()?),
                _ if self.at_operand_start() => {
                    OutputElement::Operand(self.parse_operand_element()?)
                }
                _ => break,
            };
            elements.push(element);
        }
        Ok(elements)
    }

    /// Open-ended lists stop at keywords, boundaries and the next
    /// assignment or label.
    pub(super) fn at_element_list_end(&self) -> bool {
        let kind = self.kind();
        kind.is_keyword() || self.at_boundary() || self.at_assignment_start() || self.at_label()
    }

    fn positioning(&mut self, kind: PositioningKind) -> OutputElement {
        let token = self.advance();
        OutputElement::Positioning(Positioning {
            kind,
            text: SmolStr::new(token.text),
            range: token.range,
        })
    }

    /// `'text' [(n)] [(attrs)]`
    fn parse_text_element(&mut self) -> ParseResult<TextElement> {
        let literal = self.parse_literal()?;
        let start = literal.range.start();

        let repeat = if self.at(SyntaxKind::LPAREN)
            && self.peek_kind(1) == SyntaxKind::NUMBER
            && self.peek_kind(2) == SyntaxKind::RPAREN
        {
            self.advance();
            let count = self.parse_literal()?;
            self.expect(SyntaxKind::RPAREN)?;
            Some(count)
        } else {
            None
        };

        let attributes = if self.at_attribute_list() {
            Some(self.parse_attribute_list()?)
        } else {
            None
        };

        Ok(TextElement {
            literal,
            repeat,
            attributes,
            range: self.finish(start),
        })
    }

    fn parse_operand_element(&mut self) -> ParseResult<OperandElement> {
        let operand = self.parse_operand()?;
        let start = operand.range().start();
        let attributes = if self.at_attribute_list() {
            Some(self.parse_attribute_list()?)
        } else {
            None
        };
        Ok(OperandElement {
            operand,
            attributes,
            range: self.finish(start),
        })
    }

    /// `(AD=ODL CD=RE EM=ZZ9.99)`
    ///
    /// A value runs until the closing parenthesis or the next `XX=` pair.
    /// Its text is rebuilt from the tokens, with a single blank wherever the
    /// source had whitespace.
    pub(super) fn parse_attribute_list(&mut self) -> ParseResult<AttributeList> {
        let start = self.expect(SyntaxKind::LPAREN)?.range.start();
        let mut attributes = Vec::new();

        while !self.at(SyntaxKind::RPAREN) {
            if self.at_end() {
                return Err(self.unexpected("')'"));
            }
            let name = self.expect(SyntaxKind::IDENT)?;
            self.expect(SyntaxKind::EQUALS)?;

            let mut value = String::new();
            let mut depth = 0usize;
            loop {
                let at_next_pair = self.at(SyntaxKind::IDENT)
                    && self.peek_kind(1) == SyntaxKind::EQUALS
                    && self.current().text.len() == 2
                    && !self.touches_previous();
                if self.at_end() || at_next_pair || (depth == 0 && self.at(SyntaxKind::RPAREN)) {
                    break;
                }
                if !value.is_empty() && !self.touches_previous() {
                    value.push(' ');
                }
                let token = self.advance();
                match token.kind {
                    SyntaxKind::LPAREN => depth += 1,
                    SyntaxKind::RPAREN => depth = depth.saturating_sub(1),
                    _ => {}
                }
                value.push_str(token.text);
            }
            if value.is_empty() {
                return Err(self.unexpected("an attribute value"));
            }

            attributes.push(Attribute {
                name: SmolStr::new(name.text.to_ascii_uppercase()),
                value: SmolStr::new(value),
                range: self.finish(name.range.start()),
            });
        }
        self.expect(SyntaxKind::RPAREN)?;

        Ok(AttributeList {
            attributes,
            range: self.finish(start),
        })
    }

    /// Parameters of `CALLNAT`/`FETCH`/`PERFORM`.
    pub(super) fn parse_module_parameters(&mut self) -> ParseResult<Vec<ModuleParameter>> {
        let mut parameters = Vec::new();
        while !self.at_element_list_end() {
            if self.at(SyntaxKind::SPACING) {
                let token = self.advance();
                parameters.push(ModuleParameter::Skipped {
                    count: SmolStr::new(token.text),
                    range: token.range,
                });
                continue;
            }
            if !self.at_operand_start() {
                break;
            }
            let operand = self.parse_operand()?;
            let start = operand.range().start();
            let attributes = if self.at_attribute_list() {
                Some(self.parse_attribute_list()?)
            } else {
                None
            };
            parameters.push(ModuleParameter::Value {
                operand,
                attributes,
                range: self.finish(start),
            });
        }
        Ok(parameters)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;
    use crate::syntax::ast::*;

    fn single_statement(text: &str) -> Statement {
        let parse = parse(text, UnitKind::Program);
        assert!(parse.diagnostics.is_empty(), "{:?}", parse.diagnostics);
        assert_eq!(parse.unit.body.len(), 1, "{:?}", parse.unit.body);
        parse.unit.body.into_iter().next().expect("one statement")
    }

    #[test]
    fn test_write_elements_in_source_order() {
        let Statement::Output(output) = single_statement("WRITE NOTITLE 'Name:' #NAME 5X *DATX /")
        else {
            panic!("expected output statement");
        };
        assert!(output.no_title);
        let shapes: Vec<&str> = output
            .elements
            .iter()
            .map(|e| match e {
                OutputElement::Text(_) => "text",
                OutputElement::Operand(_) => "operand",
                OutputElement::Positioning(_) => "pos",
            })
            .collect();
        assert_eq!(shapes, ["text", "operand", "pos", "operand", "pos"]);
    }

    #[test]
    fn test_attribute_lists_on_statement_and_element() {
        let Statement::Output(output) =
            single_statement("DISPLAY (PS=20) #AMOUNT (EM=ZZ9.99 AD=O) '-' (20)")
        else {
            panic!("expected output statement");
        };
        let stmt_attrs = output.statement_attributes.expect("statement attributes");
        assert_eq!(stmt_attrs.attributes[0].name, "PS");

        let OutputElement::Operand(amount) = &output.elements[0] else {
            panic!("expected operand");
        };
        let attrs = amount.attributes.as_ref().expect("element attributes");
        let pairs: Vec<(&str, &str)> = attrs
            .attributes
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_str()))
            .collect();
        assert_eq!(pairs, [("EM", "ZZ9.99"), ("AD", "O")]);

        let OutputElement::Text(dash) = &output.elements[1] else {
            panic!("expected text");
        };
        assert_eq!(dash.repeat.as_ref().map(|r| r.text.as_str()), Some("20"));
    }

    #[test]
    fn test_input_using_map() {
        let Statement::Input(input) = single_statement("INPUT (AD=M) USING MAP 'MAP01' #A #B")
        else {
            panic!("expected input statement");
        };
        assert_eq!(input.map.and_then(|m| m.string_value()).as_deref(), Some("MAP01"));
        assert_eq!(input.elements.len(), 2);
    }

    #[test]
    fn test_element_list_stops_before_assignment() {
        let parse = parse("WRITE #A\n#B := 1", UnitKind::Program);
        assert!(parse.diagnostics.is_empty(), "{:?}", parse.diagnostics);
        assert_eq!(parse.unit.body.len(), 2);
    }
}
