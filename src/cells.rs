use crate::error::Result;
use crate::views::ViewRegistry;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProfileCell {
    pub avatar: String,
    pub name: String,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusCell {
    pub status: String,
    /// CSS classes of the badge
    pub color: &'static str,
}

impl StatusCell {
    pub fn new(status: &str) -> Self {
        StatusCell {
            status: status.to_string(),
            color: status_css(status),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BasicCell {
    pub val: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModalCell {
    pub link_text: String,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TrashCell {
    pub filename: String,
    pub file_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HiddenCell {
    pub value: String,
}

/// One displayable unit of a table row
///
/// Every variant is bound to exactly one view; cells hold data only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Profile(ProfileCell),
    Status(StatusCell),
    Basic(BasicCell),
    Modal(ModalCell),
    Trash(TrashCell),
    Hidden(HiddenCell),
}

impl Cell {
    pub const PROFILE_VIEW: &'static str = "tableCell/profile";
    pub const STATUS_VIEW: &'static str = "tableCell/status";
    pub const BASIC_VIEW: &'static str = "tableCell/basic";
    pub const MODAL_VIEW: &'static str = "tableCell/modal";
    pub const TRASH_VIEW: &'static str = "tableCell/trash";
    pub const HIDDEN_VIEW: &'static str = "tableCell/hidden";

    /// Views every cell variant may render through
    pub const VIEWS: [&'static str; 6] = [
        Self::PROFILE_VIEW,
        Self::STATUS_VIEW,
        Self::BASIC_VIEW,
        Self::MODAL_VIEW,
        Self::TRASH_VIEW,
        Self::HIDDEN_VIEW,
    ];

    pub fn view(&self) -> &'static str {
        match self {
            Cell::Profile(_) => Self::PROFILE_VIEW,
            Cell::Status(_) => Self::STATUS_VIEW,
            Cell::Basic(_) => Self::BASIC_VIEW,
            Cell::Modal(_) => Self::MODAL_VIEW,
            Cell::Trash(_) => Self::TRASH_VIEW,
            Cell::Hidden(_) => Self::HIDDEN_VIEW,
        }
    }

    pub fn render(&self, views: &ViewRegistry) -> Result<String> {
        views.render(self.view(), self)
    }

    pub fn basic(val: impl ToString) -> Self {
        Cell::Basic(BasicCell {
            val: val.to_string(),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusColor {
    Green,
    Orange,
    Red,
    Grey,
    Purple,
}

impl StatusColor {
    pub fn for_status(status: &str) -> Option<Self> {
        match status {
            "Approved" => Some(StatusColor::Green),
            "Pending" => Some(StatusColor::Orange),
            "Denied" => Some(StatusColor::Red),
            "Expired" => Some(StatusColor::Grey),
            _ => None,
        }
    }

    pub fn css(&self) -> &'static str {
        match self {
            StatusColor::Green => {
                "text-green-700 bg-green-100 dark:bg-green-700 dark:text-green-100"
            }
            StatusColor::Orange => {
                "text-orange-700 bg-orange-100 dark:bg-orange-600 dark:text-white"
            }
            StatusColor::Red => "text-red-700 bg-red-100 dark:bg-red-700 dark:text-red-100",
            StatusColor::Grey => "text-gray-700 bg-gray-100 dark:text-gray-100 dark:bg-gray-700",
            StatusColor::Purple => {
                "text-white transition-colors bg-purple-600 active:bg-purple-600 hover:bg-purple-700 focus:outline-none focus:shadow-outline-purple"
            }
        }
    }
}

/// Badge classes for a status; unmapped statuses get no styling
pub fn status_css(status: &str) -> &'static str {
    StatusColor::for_status(status)
        .map(|color| color.css())
        .unwrap_or("")
}
