use dioxus::prelude::*;

use crate::t;

/// Column reference for the three uploads plus the note on official sources.
#[component]
pub fn Guide() -> Element {
    let _lang = try_use_context::<Signal<String>>().map(|code| code());

    rsx! {
        section { class: "page guide",
            h1 { {t!("guide-title")} }
            p { {t!("guide-intro")} }

            div { class: "guide__tables",
                article { class: "guide__table",
                    h3 { code { "students.csv" } }
                    pre { code { "region,level,year,students\nIndonesia,Total,2024,9320000\nJawa,Total,2024,5240000" } }
                    p { {t!("guide-students")} }
                }
                article { class: "guide__table",
                    h3 { code { "linkedin_age.csv" } }
                    pre { code { "age_group,users_million,period\n18-24,7.2,2024\n25-34,15.4,2024" } }
                    p { {t!("guide-age")} }
                }
                article { class: "guide__table",
                    h3 { code { "linkedin_monthly.csv" } }
                    pre { code { "date,users_million\n2024-01-01,27.0\n2024-02-01,27.3" } }
                    p { {t!("guide-monthly")} }
                }
            }

            h2 { {t!("guide-errors-title")} }
            ul { class: "guide__list",
                li { {t!("guide-error-schema")} }
                li { {t!("guide-error-lookup")} }
                li { {t!("guide-error-date")} }
            }

            p { class: "guide__sources",
                strong { {t!("note-label")} }
                " "
                {t!("guide-sources")}
            }
        }
    }
}
