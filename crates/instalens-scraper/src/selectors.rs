//! Every page selector the engine depends on.
//!
//! The site reshuffles its markup often; when extraction breaks, this is the
//! only file that should need editing.

use crate::driver::Locator;

pub const LOGIN_PATH: &str = "/accounts/login/";

pub static LOGIN_USERNAME: Locator = Locator::css("input[name='username']");
pub static LOGIN_PASSWORD: Locator = Locator::css("input[name='password']");

/// Only rendered for an authenticated viewer.
pub static SEARCH_BOX: Locator = Locator::xpath("//input[@placeholder='Search']");
pub static PRIMARY_NAV: Locator = Locator::xpath("//nav");

pub static CHALLENGE_PROMPT: Locator =
    Locator::xpath("//*[contains(text(),'challenge') or contains(text(),'Confirm')]");

/// Page-source markers of a second-factor prompt (lowercased).
pub const TWO_FACTOR_MARKERS: &[&str] = &["two-factor", "two factor"];

/// A named way to find the first post tile on a profile grid.
#[derive(Debug)]
pub struct FirstPostStrategy {
    pub name: &'static str,
    pub tile: Locator,
}

pub static FIRST_POST_STRATEGIES: [FirstPostStrategy; 2] = [
    FirstPostStrategy {
        name: "grid-absolute",
        tile: Locator::xpath(
            "/html/body/div[1]/div/div/div[2]/div/div/div[1]/div[2]/div[1]/section/main/div/div/div[2]/div/div/div/div/div[1]/div[1]/a",
        ),
    },
    FirstPostStrategy {
        name: "grid-generic",
        tile: Locator::xpath("(//main//a[contains(@href,'/p/') or contains(@href,'/reel/')])[1]"),
    },
];

pub static POST_TIME: Locator = Locator::xpath("//time");
pub const POST_TIME_ATTRIBUTE: &str = "datetime";

pub static LIKE_COUNT: Locator = Locator::xpath("//section[2]/div/div/span/a/span/span");

pub static NEXT_POST: Locator = Locator::xpath(
    "//div[contains(@class, '_aaqg') and contains(@class, '_aaqh')]//button[contains(@class, '_abl-')]",
);

/// A named layout of the comment thread inside the post viewer.
#[derive(Debug)]
pub struct CommentStrategy {
    pub name: &'static str,
    pub container: Locator,
    pub caption: Locator,
    pub comment_items: Locator,
    pub load_more: Locator,
}

/// Viewer mounted as the fifth body child; the layout of the first post
/// opened from the grid.
pub static THREAD_BODY_DIV5: CommentStrategy = CommentStrategy {
    name: "body-div5",
    container: Locator::xpath(
        "/html/body/div[5]/div[1]/div/div[3]/div/div/div/div/div[2]/div/article/div/div[2]/div/div/div[2]/div[1]/ul/div[3]/div/div",
    ),
    caption: Locator::xpath(
        "/html/body/div[5]/div[1]/div/div[3]/div/div/div/div/div[2]/div/article/div/div[2]/div/div/div[2]/div[1]/ul/div[1]/li/div/div/div[2]/div[1]/h1",
    ),
    comment_items: Locator::xpath(
        "/html/body/div[5]/div[1]/div/div[3]/div/div/div/div/div[2]/div/article/div/div[2]/div/div/div[2]/div[1]/ul/div[3]/div/div/div[position()>=0]/ul/div/li/div/div/div[2]/div[1]/span",
    ),
    load_more: Locator::xpath(
        "/html/body/div[5]/div[1]/div/div[3]/div/div/div/div/div[2]/div/article/div/div[2]/div/div/div[2]/div[1]/ul/div[3]/div/div/li/div/button",
    ),
};

/// Viewer mounted as the fourth body child; usual after paging forward.
pub static THREAD_BODY_DIV4: CommentStrategy = CommentStrategy {
    name: "body-div4",
    container: Locator::xpath(
        "/html/body/div[4]/div[1]/div/div[3]/div/div/div/div/div[2]/div/article/div/div[2]/div/div/div[2]/div[1]/ul/div[3]/div/div",
    ),
    caption: Locator::xpath(
        "/html/body/div[4]/div[1]/div/div[3]/div/div/div/div/div[2]/div/article/div/div[2]/div/div/div[2]/div[1]/ul/div[1]/li/div/div/div[2]/div[1]/h1",
    ),
    comment_items: Locator::xpath(
        "/html/body/div[4]/div[1]/div/div[3]/div/div/div/div/div[2]/div/article/div/div[2]/div/div/div[2]/div[1]/ul/div[3]/div/div/div[position()>=0]/ul/div/li/div/div/div[2]/div[1]/span",
    ),
    load_more: Locator::xpath(
        "/html/body/div[4]/div[1]/div/div[3]/div/div/div/div/div[2]/div/article/div/div[2]/div/div/div[2]/div[1]/ul/div[3]/div/div/li/div/button",
    ),
};

/// Position-independent fallback scoped to the dialog.
pub static THREAD_DIALOG_GENERIC: CommentStrategy = CommentStrategy {
    name: "dialog-generic",
    container: Locator::xpath("//div[@role='dialog']//article//ul"),
    caption: Locator::xpath("//div[@role='dialog']//article//ul//h1"),
    comment_items: Locator::xpath(
        "//div[@role='dialog']//article//ul/div/li/div/div/div[2]/div[1]/span",
    ),
    load_more: Locator::xpath("//div[@role='dialog']//article//ul/li/div/button"),
};

/// Thread layouts to try for the post at `sequence`, most likely first.
#[must_use]
pub fn comment_strategies(sequence: u32) -> [&'static CommentStrategy; 3] {
    if sequence <= 1 {
        [&THREAD_BODY_DIV5, &THREAD_BODY_DIV4, &THREAD_DIALOG_GENERIC]
    } else {
        [&THREAD_BODY_DIV4, &THREAD_BODY_DIV5, &THREAD_DIALOG_GENERIC]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_post_prefers_div5_layout() {
        let names: Vec<&str> = comment_strategies(1).iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["body-div5", "body-div4", "dialog-generic"]);
    }

    #[test]
    fn later_posts_prefer_div4_layout() {
        let names: Vec<&str> = comment_strategies(7).iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["body-div4", "body-div5", "dialog-generic"]);
    }

    #[test]
    fn comment_items_are_scoped_under_their_container() {
        for strategy in [&THREAD_BODY_DIV5, &THREAD_BODY_DIV4] {
            assert!(
                strategy
                    .comment_items
                    .as_str()
                    .starts_with(strategy.container.as_str()),
                "{} items escape the container",
                strategy.name
            );
            assert!(strategy.load_more.as_str().starts_with(strategy.container.as_str()));
        }
    }

    #[test]
    fn generic_first_post_comes_last() {
        assert_eq!(FIRST_POST_STRATEGIES.last().map(|s| s.name), Some("grid-generic"));
    }
}
