use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref COMMAND_RE: Regex = Regex::new(r"(?s)^/(\w+)(?:@\w+)?(?:\s+(.*))?$").unwrap();
}

/// A recognised bot command with its trimmed argument text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    ItemSubmit,
    ItemList(&'a str),
    ItemDelete(&'a str),
    ItemUpdate(&'a str),
    Cancel,
    MealCreate(&'a str),
    SayName(&'a str),
}

impl<'a> Command<'a> {
    /// Parses `/<name>[@bot] <args>`. Unknown names yield `None` so the
    /// message is handled like any other text.
    pub fn parse(text: &'a str) -> Option<Self> {
        let caps = COMMAND_RE.captures(text.trim())?;
        let name = caps.get(1)?.as_str();
        let args = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");

        let command = match name {
            "item_submit" => Self::ItemSubmit,
            "item_list" => Self::ItemList(args),
            "item_delete" => Self::ItemDelete(args),
            "item_update" => Self::ItemUpdate(args),
            "cancel" => Self::Cancel,
            "meal_create" => Self::MealCreate(args),
            "say_name" => Self::SayName(args),
            _ => return None,
        };
        Some(command)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ItemSubmit => "item_submit",
            Self::ItemList(_) => "item_list",
            Self::ItemDelete(_) => "item_delete",
            Self::ItemUpdate(_) => "item_update",
            Self::Cancel => "cancel",
            Self::MealCreate(_) => "meal_create",
            Self::SayName(_) => "say_name",
        }
    }
}
