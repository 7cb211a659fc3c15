use super::space::{ActionSpace, ActionSpec, ParamKind, ParamSpec};

/// Name of the task-completion action. The remote session acknowledges it
/// by setting `goal_reached` on the execution result.
pub const COMPLETE_ACTION: &str = "complete";

/// Build the browser action catalogue.
///
/// Registration happens once at startup; the resulting space is shared
/// read-only across runs.
pub fn builtin_space() -> ActionSpace {
    let mut space = ActionSpace::new();

    let specs = vec![
        ActionSpec::new(
            "goto",
            "Navigate the session to a URL",
            vec![ParamSpec::required(
                "url",
                ParamKind::String,
                "The URL to navigate to",
            )],
        ),
        ActionSpec::new("go_back", "Go back to the previous page", vec![]),
        ActionSpec::new(
            "click",
            "Click an interactive element",
            vec![ParamSpec::required(
                "id",
                ParamKind::String,
                "Element id from the current page listing",
            )],
        ),
        ActionSpec::new(
            "fill",
            "Type text into an input element",
            vec![
                ParamSpec::required(
                    "id",
                    ParamKind::String,
                    "Element id from the current page listing",
                ),
                ParamSpec::required("value", ParamKind::String, "Text to type"),
            ],
        ),
        ActionSpec::new(
            "select",
            "Select an option from a dropdown element",
            vec![
                ParamSpec::required(
                    "id",
                    ParamKind::String,
                    "Element id from the current page listing",
                ),
                ParamSpec::required("value", ParamKind::String, "Option value to select"),
            ],
        ),
        ActionSpec::new(
            "scroll",
            "Scroll the page to reveal more content",
            vec![
                ParamSpec::optional(
                    "direction",
                    ParamKind::String,
                    "'up' or 'down' (default down)",
                ),
                ParamSpec::optional("amount", ParamKind::Integer, "Pixels to scroll"),
            ],
        ),
        ActionSpec::new(
            "wait",
            "Wait for the page to settle",
            vec![ParamSpec::optional(
                "ms",
                ParamKind::Integer,
                "Milliseconds to wait",
            )],
        ),
        ActionSpec::new(
            "scrape",
            "Extract the visible page content as structured data",
            vec![],
        ),
        ActionSpec::new(
            COMPLETE_ACTION,
            "Report the task as finished and stop",
            vec![
                ParamSpec::required(
                    "success",
                    ParamKind::Boolean,
                    "Whether the task was accomplished",
                ),
                ParamSpec::required("answer", ParamKind::String, "Answer or summary for the user"),
            ],
        ),
    ];

    for spec in specs {
        space
            .register(spec)
            .expect("builtin action names are unique");
    }
    space
}
