//! Plain-text rendering of [`MovieInsights`].
//!
//! Grouped statistics are printed as a two-column table headed by the group
//! column and followed by a `Name: .., dtype: ..` footer; rankings as a
//! table with the row position, title and value.

use crate::types::{Frequency, GroupedStat, MovieInsights, MovieValue, NumberKind, Ranking};
use crate::utils::{format_float, format_integer, round_half_even};

/// Format a value the way its column type prints.
pub fn format_value(value: f64, kind: NumberKind) -> String {
    match kind {
        NumberKind::Integer => format_integer(value),
        NumberKind::Float => format_float(value),
    }
}

/// Render the complete report, one finding per paragraph.
pub fn render_report(insights: &MovieInsights) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(match &insights.most_common_genre {
        Some(Frequency { value, count }) => format!(
            "The most common genre is {} which occurs a total of {} times.\n",
            value, count
        ),
        None => "No movie has a main genre.\n".to_string(),
    });

    lines.push(match &insights.top_rated {
        Some(movie) => format!(
            "Top rated movie with a rating of {} is \"{}\".\n",
            format_float(movie.value),
            movie.title
        ),
        None => "No movie has a rating.\n".to_string(),
    });

    lines.push(match insights.busiest_year {
        Some((year, count)) => format!(
            "The year with the most released movies is {} with {} movies in total.\n",
            year, count
        ),
        None => "No movie has a release year.\n".to_string(),
    });

    lines.push(match insights.mean_runtime {
        Some(runtime) => format!(
            "The average runtime across all movies is {:.2} minutes.\n",
            runtime
        ),
        None => "The average runtime could not be determined.\n".to_string(),
    });

    lines.push(match &insights.most_common_language {
        Some(Frequency { value, count }) => format!(
            "The most common language was \"{}\" with {} entries.\n",
            value, count
        ),
        None => "No movie has an original language.\n".to_string(),
    });

    lines.push(highest_line("budget", &insights.highest_budget, insights.budget_kind));
    lines.push(format!(
        "{}\n",
        highest_line("revenue", &insights.highest_revenue, insights.revenue_kind)
    ));

    lines.push("The average rating per genre are:".to_string());
    lines.push(render_grouped(&insights.rating_per_genre));
    lines.push("The average rating per language are:".to_string());
    lines.push(render_grouped(&insights.rating_per_language));
    lines.push("\nThe average popularity per language are:".to_string());
    lines.push(render_grouped(&insights.popularity_per_language));
    lines.push("\nThe average popularity per genre are:".to_string());
    lines.push(render_grouped(&insights.popularity_per_genre));

    lines.push(
        "\nBelow is the trend in runtime and ratings respectively, over the years:".to_string(),
    );
    lines.push(render_grouped(&insights.runtime_per_year));
    lines.push(render_grouped(&insights.rating_per_year));

    lines.push(match insights.budget_revenue_correlation {
        Some(corr) => format!(
            "The correlation between budget and revenue is {:.2} which indicates that higher-budget films are more likely to earn more revenue, but spending more doesn't guarantee success. The relationship is not perfectly linear.",
            corr
        ),
        None => "The correlation between budget and revenue is undefined for this data.".to_string(),
    });

    if let (Some(top), Some(most)) = (&insights.top_rated, &insights.most_rated) {
        lines.push(format!(
            "\nWe can see that the top rated movie \"{}\" has an average rating of {}, while the most rated movie {} has an total rating count of {}\n",
            top.title,
            format_float(top.value),
            most.title,
            format_value(most.value, insights.vote_count_kind)
        ));
    }

    lines.push(format!(
        "The top {} highest rated movies are:",
        insights.top_rated_movies.limit
    ));
    lines.push(render_ranking(&insights.top_rated_movies));
    lines.push(format!(
        "\nThe top {} movies with the longest runtimes are:",
        insights.longest_movies.limit
    ));
    lines.push(render_ranking(&insights.longest_movies));
    lines.push(format!(
        "\nThe top {} movies with highest revenues are:",
        insights.highest_revenue_movies.limit
    ));
    lines.push(render_ranking(&insights.highest_revenue_movies));
    lines.push(format!(
        "\nThe top {} movies with highest budgets are:",
        insights.highest_budget_movies.limit
    ));
    lines.push(render_ranking(&insights.highest_budget_movies));

    lines.push(match &insights.most_recurring_company {
        Some(company) => format!("The most recurring company is {}.", company.value),
        None => "No movie has a main production company.".to_string(),
    });

    if let Some((genre, median)) = &insights.most_successful_genre {
        lines.push(format!(
            "\nOn average, {} had the best revenue with ${}, making it the most successful genre financially.",
            genre,
            format_integer(round_half_even(*median))
        ));
    }

    lines.join("\n")
}

/// Closing line printed once the cleaned table is on disk.
pub fn saved_line(output_path: &str) -> String {
    format!("\nCleaned dataset saved as '{}'", output_path)
}

fn highest_line(label: &str, movie: &Option<MovieValue>, kind: NumberKind) -> String {
    match movie {
        Some(movie) => format!(
            "The movie with the highest {} is \"{}\" with a {} of ${}.",
            label,
            movie.title,
            label,
            format_value(movie.value, kind)
        ),
        None => format!("No movie has a {}.", label),
    }
}

/// Key/value table with a footer naming the aggregated column.
pub fn render_grouped(stat: &GroupedStat) -> String {
    let values: Vec<String> = stat
        .groups
        .iter()
        .map(|(_, value)| format!("{:.6}", value))
        .collect();

    let key_width = stat
        .groups
        .iter()
        .map(|(key, _)| key.chars().count())
        .max()
        .unwrap_or(0);
    let value_width = values.iter().map(String::len).max().unwrap_or(0);

    let mut out = vec![stat.group_by.clone()];
    for ((key, _), value) in stat.groups.iter().zip(&values) {
        out.push(format!(
            "{:<key_width$}    {:>value_width$}",
            key,
            value,
            key_width = key_width,
            value_width = value_width
        ));
    }
    out.push(format!("Name: {}, dtype: float64", stat.column));
    out.join("\n")
}

/// Row position, title and value, right aligned under a header.
pub fn render_ranking(ranking: &Ranking) -> String {
    const TITLE_HEADER: &str = "original_title";

    let rows: Vec<(String, &str, String)> = ranking
        .entries
        .iter()
        .map(|m| {
            (
                m.row.to_string(),
                m.title.as_str(),
                format_value(m.value, ranking.kind),
            )
        })
        .collect();

    let index_width = rows.iter().map(|r| r.0.len()).max().unwrap_or(0);
    let title_width = rows
        .iter()
        .map(|r| r.1.chars().count())
        .max()
        .unwrap_or(0)
        .max(TITLE_HEADER.len());
    let value_width = rows
        .iter()
        .map(|r| r.2.len())
        .max()
        .unwrap_or(0)
        .max(ranking.column.len());

    let mut out = vec![format!(
        "{:index_width$}  {:>title_width$}  {:>value_width$}",
        "",
        TITLE_HEADER,
        ranking.column,
        index_width = index_width,
        title_width = title_width,
        value_width = value_width
    )];
    for (index, title, value) in &rows {
        out.push(format!(
            "{:<index_width$}  {:>title_width$}  {:>value_width$}",
            index,
            title,
            value,
            index_width = index_width,
            title_width = title_width,
            value_width = value_width
        ));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn movie(title: &str, value: f64, row: usize) -> MovieValue {
        MovieValue {
            title: title.to_string(),
            value,
            row,
        }
    }

    fn grouped(group_by: &str, column: &str, groups: &[(&str, f64)]) -> GroupedStat {
        GroupedStat {
            group_by: group_by.to_string(),
            column: column.to_string(),
            aggregate: "mean".to_string(),
            groups: groups.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    fn ranking(column: &str, kind: NumberKind, entries: Vec<MovieValue>) -> Ranking {
        Ranking {
            column: column.to_string(),
            kind,
            limit: 10,
            entries,
        }
    }

    fn insights() -> MovieInsights {
        MovieInsights {
            movie_count: 3,
            most_common_genre: Some(Frequency {
                value: "Drama".to_string(),
                count: 2,
            }),
            top_rated: Some(movie("Whiplash", 8.5, 1)),
            busiest_year: Some((2014, 2)),
            mean_runtime: Some(106.88),
            most_common_language: Some(Frequency {
                value: "en".to_string(),
                count: 3,
            }),
            highest_budget: Some(movie("Avatar", 237000000.0, 0)),
            highest_revenue: Some(movie("Avatar", 2787965087.0, 0)),
            budget_kind: NumberKind::Integer,
            revenue_kind: NumberKind::Integer,
            vote_count_kind: NumberKind::Integer,
            rating_per_genre: grouped("main_genre", "vote_average", &[("Drama", 8.0)]),
            rating_per_language: grouped("original_language", "vote_average", &[("en", 7.5)]),
            popularity_per_language: grouped("original_language", "popularity", &[("en", 50.0)]),
            popularity_per_genre: grouped("main_genre", "popularity", &[("Drama", 40.0)]),
            runtime_per_year: grouped("release_year", "runtime", &[("2014", 107.0)]),
            rating_per_year: grouped("release_year", "vote_average", &[("2014", 8.0)]),
            budget_revenue_correlation: Some(0.7312),
            most_rated: Some(movie("Avatar", 11800.0, 0)),
            top_rated_movies: ranking(
                "vote_average",
                NumberKind::Float,
                vec![movie("Whiplash", 8.5, 1), movie("Avatar", 7.2, 0)],
            ),
            longest_movies: ranking("runtime", NumberKind::Float, vec![movie("Avatar", 162.0, 0)]),
            highest_revenue_movies: ranking(
                "revenue",
                NumberKind::Integer,
                vec![movie("Avatar", 2787965087.0, 0)],
            ),
            highest_budget_movies: ranking(
                "budget",
                NumberKind::Integer,
                vec![movie("Avatar", 237000000.0, 0)],
            ),
            most_recurring_company: Some(Frequency {
                value: "Warner Bros.".to_string(),
                count: 2,
            }),
            most_successful_genre: Some(("Drama".to_string(), 13092000.5)),
        }
    }

    #[test]
    fn test_format_value_by_kind() {
        assert_eq!(format_value(237000000.0, NumberKind::Integer), "237000000");
        assert_eq!(format_value(10.0, NumberKind::Float), "10.0");
    }

    #[test]
    fn test_report_lines() {
        let report = render_report(&insights());

        for expected in [
            "The most common genre is Drama which occurs a total of 2 times.",
            "Top rated movie with a rating of 8.5 is \"Whiplash\".",
            "The year with the most released movies is 2014 with 2 movies in total.",
            "The average runtime across all movies is 106.88 minutes.",
            "The most common language was \"en\" with 3 entries.",
            "The movie with the highest budget is \"Avatar\" with a budget of $237000000.",
            "The movie with the highest revenue is \"Avatar\" with a revenue of $2787965087.",
            "The correlation between budget and revenue is 0.73 which indicates",
            "We can see that the top rated movie \"Whiplash\" has an average rating of 8.5, while the most rated movie Avatar has an total rating count of 11800",
            "The top 10 highest rated movies are:",
            "The most recurring company is Warner Bros..",
            "On average, Drama had the best revenue with $13092000, making it the most successful genre financially.",
        ] {
            assert!(report.contains(expected), "missing line: {}", expected);
        }
    }

    #[test]
    fn test_report_without_findings() {
        let mut empty = insights();
        empty.most_common_genre = None;
        empty.top_rated = None;
        empty.budget_revenue_correlation = None;
        empty.most_successful_genre = None;

        let report = render_report(&empty);
        assert!(report.contains("No movie has a main genre."));
        assert!(!report.contains("We can see that"));
        assert!(!report.contains("On average,"));
        assert!(report.contains("undefined"));
    }

    #[test]
    fn test_render_grouped_aligns_keys() {
        let stat = grouped("main_genre", "vote_average", &[("Action", 6.5), ("War", 7.25)]);
        assert_eq!(
            render_grouped(&stat),
            "main_genre\nAction    6.500000\nWar       7.250000\nName: vote_average, dtype: float64"
        );
    }

    #[test]
    fn test_render_ranking() {
        let table = render_ranking(&ranking(
            "budget",
            NumberKind::Integer,
            vec![movie("Avatar", 237000000.0, 0), movie("Up", 175000000.0, 12)],
        ));
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "    original_title     budget");
        assert_eq!(lines[1], "0           Avatar  237000000");
        assert_eq!(lines[2], "12              Up  175000000");
    }

    #[test]
    fn test_saved_line() {
        assert_eq!(
            saved_line("cleaned_tmdb_movies.csv"),
            "\nCleaned dataset saved as 'cleaned_tmdb_movies.csv'"
        );
    }
}
