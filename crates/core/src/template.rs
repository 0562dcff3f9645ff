//! Template Catalog
//!
//! The fixed list of industry templates shown on the templates page, together
//! with the category filter and slug lookup driven by the page's query string.
//! A template's title also decides which demo widget its preview mounts.

use crate::widget::WidgetKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The filter value that selects every template.
pub const ALL_CATEGORIES: &str = "all";

/// The business area a template belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sales,
    Support,
    Booking,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Sales, Category::Support, Category::Booking];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sales => "sales",
            Category::Support => "support",
            Category::Booking => "booking",
        }
    }

    /// The label shown on the filter tab.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Sales => "Sales & Lead Gen",
            Category::Support => "Customer Support",
            Category::Booking => "Booking & Scheduling",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown template category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// A static marketing descriptor for one industry use case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateDescriptor {
    pub title: &'static str,
    pub description: &'static str,
    pub features: &'static [&'static str],
    pub category: Category,
    pub sample_questions: &'static [&'static str],
}

impl TemplateDescriptor {
    /// The URL slug used by `?template=`: lowercase with spaces as dashes.
    pub fn slug(&self) -> String {
        self.title.to_lowercase().replace(' ', "-")
    }

    pub fn widget_kind(&self) -> WidgetKind {
        WidgetKind::for_title(self.title)
    }

    /// Whether the preview advertises voice as well as text.
    pub fn is_voice_bot(&self) -> bool {
        VOICE_BOT_TITLES.contains(&self.title)
    }

    pub fn demo_heading(&self) -> &'static str {
        if self.is_voice_bot() {
            "Live Voice & Chat Demo"
        } else {
            "Live Chat Demo"
        }
    }
}

const VOICE_BOT_TITLES: [&str; 2] = ["Restaurant Reservation Bot", "Professional Services Bot"];

static CATALOG: [TemplateDescriptor; 9] = [
    TemplateDescriptor {
        title: "Restaurant Reservation Bot",
        category: Category::Booking,
        description: "Take reservations, answer menu questions, handle special requests, and manage waitlists.",
        features: &["Table management", "Menu inquiries", "Special requests", "Waitlist"],
        sample_questions: &[
            "Do you have a table for 2 tonight at 7pm?",
            "Can I see today's menu and specials?",
            "I have a peanut allergy, can the kitchen accommodate?",
        ],
    },
    TemplateDescriptor {
        title: "Professional Services Bot",
        category: Category::Support,
        description: "Qualify clients, schedule consultations, explain services, and collect project requirements.",
        features: &[
            "Client intake",
            "Consultation booking",
            "Service catalog",
            "Proposal requests",
        ],
        sample_questions: &[
            "How can I schedule a consultation with your team?",
            "What services do you offer for small businesses?",
            "Can you provide a quote or proposal for my project?",
        ],
    },
    TemplateDescriptor {
        title: "Retail & E-commerce Bot",
        category: Category::Sales,
        description: "Handle product inquiries, track orders, process returns, and capture leads 24/7.",
        features: &["Food Ordering", "Menu navigations", "Diet plans", "customize experience"],
        sample_questions: &[
            "I want to order a beef burger with no onions",
            "Where is my order",
            "can you suggest me some healthy meal options?",
        ],
    },
    TemplateDescriptor {
        title: "Salon & Spa Booking Bot",
        category: Category::Booking,
        description: "Book appointments, send reminders, manage staff schedules, and handle client preferences.",
        features: &["Online booking", "SMS reminders", "Staff management", "Client profiles"],
        sample_questions: &[
            "Can I book a haircut and color for Saturday at 2pm?",
            "What are your service prices and available stylists?",
            "How do I reschedule or cancel my appointment?",
        ],
    },
    TemplateDescriptor {
        title: "Medical & Clinic Assistant",
        category: Category::Booking,
        description: "Schedule patient appointments, answer common health questions, and send appointment reminders.",
        features: &[
            "HIPAA compliant",
            "Patient scheduling",
            "Prescription reminders",
            "Symptom checker",
        ],
        sample_questions: &[
            "How can I book an appointment with Dr. Smith next week?",
            "Are you accepting new patients and do you take my insurance?",
            "What should I do for acute allergy symptoms right now?",
        ],
    },
    TemplateDescriptor {
        title: "Real Estate Agent Bot",
        category: Category::Sales,
        description: "Qualify leads, schedule property viewings, provide listing information, and follow up automatically.",
        features: &[
            "Lead qualification",
            "Viewing scheduler",
            "Property details",
            "Market updates",
        ],
        sample_questions: &[
            "Is the 3-bed house on Maple Ave still available for viewing?",
            "Can you schedule a showing for Saturday afternoon?",
            "What is the asking price and HOA fees for this listing?",
        ],
    },
    TemplateDescriptor {
        title: "SaaS Support Bot",
        category: Category::Support,
        description: "Support customers, demo features, collect feedback, and route complex issues to your team.",
        features: &["Product demos", "Ticket creation", "Feature requests", "Knowledge base"],
        sample_questions: &[
            "How do I reset my account password?",
            "How can I enable feature X for my team?",
            "I found a bug, how do I report it and get support?",
        ],
    },
    TemplateDescriptor {
        title: "Education & Training Bot",
        category: Category::Support,
        description: "Answer course questions, manage enrollments, provide student support, and collect feedback.",
        features: &["Course information", "Enrollment", "Student support", "Resource library"],
        sample_questions: &[
            "How do I enroll in the Data Science bootcamp?",
            "What are the prerequisites for the advanced course?",
            "When does the next cohort start and what is the schedule?",
        ],
    },
    TemplateDescriptor {
        title: "Retail Store Assistant",
        category: Category::Sales,
        description: "Help customers find products, check inventory, provide store hours, and capture feedback.",
        features: &["Product finder", "Inventory check", "Store information", "Customer feedback"],
        sample_questions: &[
            "Do you have these red sneakers in size 8?",
            "What are your store hours this weekend?",
            "Can I reserve an item online for in-store pickup?",
        ],
    },
];

/// Every template, in display order.
pub fn catalog() -> &'static [TemplateDescriptor] {
    &CATALOG
}

/// Applies the templates page's category filter.
///
/// `None` and `"all"` select everything; an unrecognized category selects
/// nothing rather than falling back to the full list.
pub fn filter_by_category(filter: Option<&str>) -> Vec<&'static TemplateDescriptor> {
    match filter {
        None | Some(ALL_CATEGORIES) => CATALOG.iter().collect(),
        Some(name) => match name.parse::<Category>() {
            Ok(category) => CATALOG.iter().filter(|t| t.category == category).collect(),
            Err(_) => Vec::new(),
        },
    }
}

pub fn find_by_slug(slug: &str) -> Option<&'static TemplateDescriptor> {
    CATALOG.iter().find(|t| t.slug() == slug)
}

pub fn find_by_title(title: &str) -> Option<&'static TemplateDescriptor> {
    CATALOG.iter().find(|t| t.title == title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_filter_returns_full_catalog() {
        assert_eq!(filter_by_category(None).len(), 9);
        assert_eq!(filter_by_category(Some("all")).len(), 9);
    }

    #[test]
    fn test_category_filter() {
        let booking = filter_by_category(Some("booking"));
        assert_eq!(booking.len(), 3);
        assert!(booking.iter().all(|t| t.category == Category::Booking));
        assert_eq!(filter_by_category(Some("sales")).len(), 3);
        assert_eq!(filter_by_category(Some("support")).len(), 3);
    }

    #[test]
    fn test_unknown_category_is_empty() {
        assert!(filter_by_category(Some("gardening")).is_empty());
        assert!(filter_by_category(Some("Booking")).is_empty());
    }

    #[test]
    fn test_slug_lookup() {
        let template = find_by_slug("restaurant-reservation-bot").expect("template");
        assert_eq!(template.title, "Restaurant Reservation Bot");
        assert_eq!(template.widget_kind(), WidgetKind::Voice);

        let retail = find_by_slug("retail-&-e-commerce-bot").expect("template");
        assert_eq!(retail.widget_kind(), WidgetKind::Chat);

        assert!(find_by_slug("Restaurant Reservation Bot").is_none());
    }

    #[test]
    fn test_voice_bot_headings() {
        let professional = find_by_title("Professional Services Bot").unwrap();
        assert!(professional.is_voice_bot());
        assert_eq!(professional.demo_heading(), "Live Voice & Chat Demo");
        assert_eq!(professional.widget_kind(), WidgetKind::Placeholder);

        let saas = find_by_title("SaaS Support Bot").unwrap();
        assert!(!saas.is_voice_bot());
        assert_eq!(saas.demo_heading(), "Live Chat Demo");
    }

    #[test]
    fn test_exactly_one_voice_and_one_chat_template() {
        let kinds: Vec<_> = catalog().iter().map(|t| t.widget_kind()).collect();
        assert_eq!(kinds.iter().filter(|k| **k == WidgetKind::Voice).count(), 1);
        assert_eq!(kinds.iter().filter(|k| **k == WidgetKind::Chat).count(), 1);
    }

    #[test]
    fn test_category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
        assert_eq!(
            "nope".parse::<Category>(),
            Err(UnknownCategory("nope".to_string()))
        );
    }
}
