use super::{ArgumentDescriptor, CommandLineParser};

impl CommandLineParser {
    /// Width of the name column in the help text
    #[must_use]
    pub fn field_width(&self) -> usize {
        self.descriptors
            .iter()
            .map(|d| d.names_column(&self.long_prefix, &self.short_prefix).chars().count() + 2)
            .max()
            .unwrap_or(0)
    }

    /// Help text, one section per group. Deprecated arguments are listed last.
    #[must_use]
    pub fn help_text(&self) -> String {
        let width = self.field_width();
        let mut text = String::new();
        let mut deprecated: Vec<&ArgumentDescriptor> = Vec::new();

        for (group, indices) in &self.groups {
            if !group.is_empty() {
                text.push('\n');
                text.push_str(group);
                text.push('\n');
            }
            for &index in indices {
                let desc = &self.descriptors[index];
                if desc.deprecated {
                    deprecated.push(desc);
                } else {
                    text.push_str(&self.help_line(desc, width));
                }
            }
        }

        if !deprecated.is_empty() {
            text.push_str("\nDeprecated arguments:\n");
            for desc in deprecated {
                text.push_str(&self.help_line(desc, width));
            }
        }

        text
    }

    fn help_line(&self, desc: &ArgumentDescriptor, width: usize) -> String {
        let stored = if self.use_settings {
            self.settings
                .as_deref()
                .and_then(|s| s.value(desc.canonical_name()))
                .and_then(|raw| desc.kind.coerce(&raw))
                .map(|v| v.to_string())
        } else {
            None
        };
        desc.help_line(width, &self.long_prefix, &self.short_prefix, stored.as_deref())
    }
}
