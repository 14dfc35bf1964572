//! Identifiers, numbers and back-references.

use sym_tree::{Kind, Node, C_SYNTHESIZED_MODULE, OBJC_MODULE};

use super::{stdlib_type, ty, DemangleResult, Demangler, MAX_NUM_WORDS, MAX_REPEAT_COUNT};
use crate::{punycode, tables};

/// Offset of a letter within its case, `a`/`A` being 0.
fn letter_offset(c: char, first: char) -> usize {
    (u32::from(c) - u32::from(first)) as usize
}

impl Demangler<'_> {
    // =========================================================================
    // Numbers
    // =========================================================================

    pub(super) fn demangle_natural(&mut self) -> Option<u64> {
        self.cursor.conditional_int()
    }

    /// A natural that must be present and fit in memory-sized counts.
    pub(super) fn demangle_count(&mut self) -> DemangleResult<usize> {
        let natural = self.demangle_natural();
        let natural = self.require(natural)?;
        self.require(usize::try_from(natural).ok())
    }

    /// `_` is 0; `<n>_` is n + 1.
    pub(super) fn demangle_index(&mut self) -> DemangleResult<u64> {
        if self.cursor.conditional('_') {
            return Ok(0);
        }
        let natural = self.demangle_natural();
        let value = self.require(natural)?;
        self.cursor.match_scalar('_')?;
        self.require(value.checked_add(1))
    }

    pub(super) fn demangle_index_as_name(&mut self) -> DemangleResult<Node> {
        Ok(Node::with_index(Kind::Number, self.demangle_index()?))
    }

    // =========================================================================
    // Identifiers
    // =========================================================================

    /// Length-prefixed identifier, possibly word-compressed or punycoded.
    ///
    /// A leading `0` switches on word substitutions: lowercase letters pull a
    /// word from the table and continue, an uppercase letter pulls the last
    /// word. `00` marks a punycoded identifier. Every decoded identifier is
    /// a back-reference target.
    pub(super) fn demangle_identifier(&mut self) -> DemangleResult<Node> {
        let mut has_word_substitutions = false;
        let mut is_punycoded = false;
        if self.cursor.read(|c| c.is_ascii_digit())? == '0' {
            if self.cursor.read_scalar()? == '0' {
                is_punycoded = true;
            } else {
                self.cursor.backtrack(1)?;
                has_word_substitutions = true;
            }
        } else {
            self.cursor.backtrack(1)?;
        }

        let mut identifier = String::new();
        loop {
            while has_word_substitutions
                && self.cursor.peek().is_some_and(|c| c.is_ascii_alphabetic())
            {
                let c = self.cursor.read_scalar()?;
                let word_index = if c.is_ascii_lowercase() {
                    letter_offset(c, 'a')
                } else {
                    has_word_substitutions = false;
                    letter_offset(c, 'A')
                };
                self.ensure(word_index < MAX_NUM_WORDS)?;
                let word = self.require(self.words.get(word_index))?;
                identifier.push_str(word);
            }
            if self.cursor.conditional('0') {
                break;
            }
            let len = self.demangle_count()?;
            self.ensure(len > 0)?;
            if is_punycoded {
                self.cursor.conditional('_');
            }
            let text = self.cursor.read_scalars(len)?;
            if is_punycoded {
                identifier.push_str(&self.require(punycode::decode(&text))?);
            } else {
                identifier.push_str(&text);
                self.record_words(&text);
            }
            if !has_word_substitutions {
                break;
            }
        }

        self.ensure(!identifier.is_empty())?;
        let node = Node::with_text(Kind::Identifier, identifier);
        self.push_substitution(node.clone());
        Ok(node)
    }

    /// Split `text` into words for later word substitutions.
    ///
    /// A word starts at a non-digit, non-`_` scalar and ends before `_` or
    /// before an uppercase letter that follows a non-uppercase one. Only
    /// words of two or more scalars are kept.
    fn record_words(&mut self, text: &str) {
        let mut word: Option<String> = None;
        for c in text.chars() {
            match word.as_mut() {
                None => {
                    if self.starts_word(c) {
                        word = Some(c.to_string());
                    }
                }
                Some(current) => {
                    let after_lower = current.chars().last().is_some_and(|l| !l.is_ascii_uppercase());
                    if c == '_' || (after_lower && c.is_ascii_uppercase()) {
                        if current.chars().count() >= 2 {
                            self.words.push(current.clone());
                        }
                        word = self.starts_word(c).then(|| c.to_string());
                    } else {
                        current.push(c);
                    }
                }
            }
        }
        if let Some(last) = word.filter(|w| w.chars().count() >= 2) {
            self.words.push(last);
        }
    }

    fn starts_word(&self, c: char) -> bool {
        !c.is_ascii_digit() && c != '_' && self.words.len() < MAX_NUM_WORDS
    }

    /// `o<fixity>`: the preceding identifier spells an operator in letter code.
    pub(super) fn demangle_operator_identifier(&mut self) -> DemangleResult<Node> {
        let ident = self.pop_required_kind(Kind::Identifier)?;
        let text = self.require(ident.text())?;
        let mut spelled = String::with_capacity(text.len());
        for c in text.chars() {
            if c.is_ascii() {
                spelled.push(self.require(tables::operator_char(c))?);
            } else {
                spelled.push(c);
            }
        }
        let kind = match self.cursor.read_scalar()? {
            'i' => Kind::InfixOperator,
            'p' => Kind::PrefixOperator,
            'P' => Kind::PostfixOperator,
            _ => return Err(self.fail()),
        };
        Ok(Node::with_text(kind, spelled))
    }

    /// `L`: private, related-entity and local declaration names.
    pub(super) fn demangle_local_identifier(&mut self) -> DemangleResult<Node> {
        let c = self.cursor.read_scalar()?;
        match c {
            'L' => {
                let discriminator = self.pop_required_kind(Kind::Identifier)?;
                let name = self.pop_decl_name()?;
                Ok(Node::with_children(Kind::PrivateDeclName, [discriminator, name]))
            }
            'l' => {
                let discriminator = self.pop_required_kind(Kind::Identifier)?;
                Ok(Node::with_child(Kind::PrivateDeclName, discriminator))
            }
            'a'..='j' | 'A'..='J' => {
                let entity = self.pop_required()?;
                Ok(Node::with_children(
                    Kind::RelatedEntityDeclName,
                    [Node::with_text(Kind::Identifier, c.to_string()), entity],
                ))
            }
            _ => {
                self.cursor.backtrack(1)?;
                let discriminator = self.demangle_index_as_name()?;
                let name = self.pop_decl_name()?;
                Ok(Node::with_children(Kind::LocalDeclName, [discriminator, name]))
            }
        }
    }

    // =========================================================================
    // Substitutions
    // =========================================================================

    /// `A`: one or more back-references.
    ///
    /// Lowercase letters push a reference and continue, an uppercase letter
    /// returns the last one. Each may carry a repeat count. `<n>_` addresses
    /// entries past the 26 letters.
    pub(super) fn demangle_multi_substitutions(&mut self) -> DemangleResult<Node> {
        let mut repeat_count: Option<u64> = None;
        loop {
            let c = self.cursor.read_scalar()?;
            match c {
                'a'..='z' => {
                    let node = self.push_multi_substitutions(repeat_count, letter_offset(c, 'a'))?;
                    self.name_stack.push(node);
                    repeat_count = None;
                }
                'A'..='Z' => {
                    return self.push_multi_substitutions(repeat_count, letter_offset(c, 'A'));
                }
                '_' => {
                    let index = repeat_count.map_or(Some(26), |n| n.checked_add(27));
                    let index = self.require(index.and_then(|i| usize::try_from(i).ok()))?;
                    return self.require(self.substitutions.get(index).cloned());
                }
                _ => {
                    self.cursor.backtrack(1)?;
                    let natural = self.demangle_natural();
                    repeat_count = Some(self.require(natural)?);
                }
            }
        }
    }

    /// Look up `index`, pushing `repeat_count - 1` extra copies.
    fn push_multi_substitutions(
        &mut self,
        repeat_count: Option<u64>,
        index: usize,
    ) -> DemangleResult<Node> {
        let repeat_count = repeat_count.unwrap_or(0);
        self.ensure(repeat_count <= MAX_REPEAT_COUNT)?;
        let node = self.require(self.substitutions.get(index).cloned())?;
        for _ in 1..repeat_count {
            self.name_stack.push(node.clone());
        }
        Ok(node)
    }

    /// `S`: modules, `Optional` sugar and the fixed standard tables.
    ///
    /// Table entries are not back-reference targets; `Sg` is.
    pub(super) fn demangle_standard_substitution(&mut self) -> DemangleResult<Node> {
        match self.cursor.read_scalar()? {
            'o' => Ok(Node::with_text(Kind::Module, OBJC_MODULE)),
            'C' => Ok(Node::with_text(Kind::Module, C_SYNTHESIZED_MODULE)),
            'g' => {
                let wrapped = self.pop_type()?;
                let optional = ty(Node::with_children(
                    Kind::BoundGenericEnum,
                    [
                        stdlib_type(Kind::Enum, "Optional"),
                        Node::with_child(Kind::TypeList, wrapped),
                    ],
                ));
                self.push_substitution(optional.clone());
                Ok(optional)
            }
            _ => {
                self.cursor.backtrack(1)?;
                let repeat_count = self.demangle_natural().unwrap_or(0);
                self.ensure(repeat_count <= MAX_REPEAT_COUNT)?;
                let entry = if self.cursor.conditional('c') {
                    tables::concurrency(self.cursor.read_scalar()?)
                } else {
                    tables::standard(self.cursor.read_scalar()?)
                };
                let entry = self.require(entry)?;
                let node = stdlib_type(entry.kind, entry.name);
                for _ in 1..repeat_count {
                    self.name_stack.push(node.clone());
                }
                Ok(node)
            }
        }
    }
}
