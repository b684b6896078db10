//! Insertion placement and reselection driven by opener relationships

mod common;

use common::{active_title, page, page_at, strip, title_at, titles};
use tabstrip_core::TabStripConfig;
use tabstrip_model::{
    AddTabFlags, CloseTabFlags, DefaultDelegate, InsertionPolicy, PageInfo, PageTransition,
    TabStripModel,
};

/// Insert each page where a background link click from the active tab
/// would put it.
fn insert_background_links(strip: &mut TabStripModel<PageInfo>, names: &[&str]) {
    for name in names {
        let index = strip
            .order_controller()
            .determine_insertion_index(strip, PageTransition::Link, false);
        strip.insert_tab_contents_at(index, page(name), AddTabFlags::INHERIT_GROUP);
    }
}

fn add(strip: &mut TabStripModel<PageInfo>, name: &str, transition: PageTransition, flags: AddTabFlags) {
    strip.add_tab_contents(page(name), None, transition, flags);
}

#[test]
fn test_basic_opener_api() {
    let mut strip = strip();
    strip.append_tab_contents(page("opener"), true);
    for name in ["1", "2", "3", "4", "5"] {
        let count = strip.count();
        strip.insert_tab_contents_at(count, page(name), AddTabFlags::INHERIT_GROUP);
    }
    let opener = strip.id_at(0);

    for i in 1..strip.count() {
        assert_eq!(strip.opener_of(i), Some(opener));
    }

    // Next adjacent sibling, or the preceding one at the end of the group.
    assert_eq!(strip.index_of_next_tab_opened_by(opener, 1, false), Some(2));
    assert_eq!(strip.index_of_next_tab_opened_by(opener, 5, false), Some(4));
    assert_eq!(strip.index_of_last_tab_opened_by(opener, 1), Some(5));

    let first_child = strip.id_at(1);
    assert_eq!(strip.index_of_next_tab_opened_by(first_child, 3, false), None);
    assert_eq!(strip.index_of_last_tab_opened_by(first_child, 3), None);

    strip.forget_all_openers();
    assert_eq!(strip.index_of_next_tab_opened_by(opener, 1, false), None);
    assert_eq!(strip.index_of_next_tab_opened_by(opener, 5, false), None);
    assert_eq!(strip.index_of_last_tab_opened_by(opener, 1), None);
    // Groups survive forgetting openers.
    assert_eq!(strip.index_of_next_tab_opened_by(opener, 1, true), Some(2));

    let last = strip.id_at(5);
    for i in 0..strip.count() - 1 {
        strip.set_opener_of(i, last);
    }
    for i in 0..strip.count() - 1 {
        assert_eq!(strip.opener_of(i), Some(last));
    }
    assert_eq!(strip.index_of_next_tab_opened_by(last, 1, false), Some(2));
    assert_eq!(strip.index_of_next_tab_opened_by(last, 4, false), Some(3));

    assert!(strip.close_all_tabs());
    assert!(strip.is_empty());
}

#[test]
fn test_inherit_opener_sets_only_the_opener() {
    let mut strip = strip();
    strip.append_tab_contents(page("opener"), true);
    let opener = strip.id_at(0);

    strip.insert_tab_contents_at(1, page("a"), AddTabFlags::INHERIT_OPENER);
    assert_eq!(strip.opener_of(1), Some(opener));
    assert_eq!(strip.group_of(1), None);
    assert_eq!(strip.active_index(), Some(0));

    // Opening in the foreground forgets every existing opener first.
    strip.insert_tab_contents_at(
        2,
        page("b"),
        AddTabFlags::INHERIT_OPENER | AddTabFlags::ACTIVE,
    );
    assert_eq!(titles(&strip), "opener a b");
    assert_eq!(strip.opener_of(1), None);
    assert_eq!(strip.opener_of(2), Some(opener));
    assert_eq!(strip.group_of(2), None);
    assert_eq!(strip.active_index(), Some(2));
}

#[test]
fn test_background_links_open_left_to_right() {
    let mut strip = strip();
    strip.append_tab_contents(page("opener"), true);
    insert_background_links(&mut strip, &["1", "2", "3"]);
    assert_eq!(titles(&strip), "opener 1 2 3");
}

#[test]
fn test_insert_before_reverses_order() {
    let mut strip = strip();
    strip.set_insertion_policy(InsertionPolicy::InsertBefore);
    insert_background_links(&mut strip, &["1", "2", "3"]);
    assert_eq!(titles(&strip), "3 2 1");
    assert_eq!(strip.config().insertion_policy, InsertionPolicy::InsertBefore);
}

#[test]
fn test_insert_before_with_opener() {
    let mut strip = strip();
    strip.set_insertion_policy(InsertionPolicy::InsertBefore);
    strip.append_tab_contents(page("opener"), true);
    insert_background_links(&mut strip, &["1", "2", "3"]);
    assert_eq!(titles(&strip), "3 2 1 opener");
}

#[test]
fn test_insertion_index_determination() {
    let mut strip = strip();
    strip.append_tab_contents(page("opener"), true);
    let opener = strip.id_at(0);
    // An unrelated background tab should not disturb link placement.
    strip.append_tab_contents(page("other"), false);

    insert_background_links(&mut strip, &["1", "2", "3"]);
    assert_eq!(titles(&strip), "opener 1 2 3 other");

    assert_eq!(strip.index_of_next_tab_opened_by(opener, 2, false), Some(3));
    assert_eq!(strip.index_of_next_tab_opened_by(opener, 3, false), Some(2));
    assert_eq!(strip.index_of_last_tab_opened_by(opener, 1), Some(3));

    // A foreground link opens right next to its opener.
    let index = strip
        .order_controller()
        .determine_insertion_index(&strip, PageTransition::Link, true);
    assert_eq!(index, 1);
    strip.insert_tab_contents_at(
        index,
        page("fg"),
        AddTabFlags::ACTIVE | AddTabFlags::INHERIT_GROUP,
    );
    assert_eq!(strip.active_index(), Some(1));
    assert_eq!(active_title(&strip), "fg");

    // Closing it goes back to the opener.
    strip.close_selected_tabs();
    assert_eq!(strip.active_index(), Some(0));

    // Anything other than a link appends.
    let index = strip
        .order_controller()
        .determine_insertion_index(&strip, PageTransition::AutoBookmark, true);
    assert_eq!(index, strip.count());
    strip.insert_tab_contents_at(index, page("bookmark"), AddTabFlags::empty());

    // Switching to it by hand breaks the opener context.
    strip.activate_tab_at(strip.count() - 1, true);
    assert_eq!(active_title(&strip), "bookmark");
    assert_eq!(strip.index_of_next_tab_opened_by(opener, 2, false), None);
    assert_eq!(strip.index_of_next_tab_opened_by(opener, 3, false), None);
    assert_eq!(strip.index_of_last_tab_opened_by(opener, 1), None);
}

#[test]
fn test_select_on_close() {
    let mut strip = strip();
    strip.append_tab_contents(page("opener"), true);

    // Closing background tabs leaves the active tab alone.
    insert_background_links(&mut strip, &["1", "2", "3"]);
    assert_eq!(strip.active_index(), Some(0));
    strip.detach_tab_contents_at(1);
    assert_eq!(strip.active_index(), Some(0));
    while strip.count() > 1 {
        strip.detach_tab_contents_at(strip.count() - 1);
    }

    // Without an opener the tab to the right takes over.
    insert_background_links(&mut strip, &["1", "2", "3"]);
    strip.forget_all_openers();
    strip.activate_tab_at(1, true);
    assert_eq!(strip.active_index(), Some(1));
    strip.detach_tab_contents_at(1);
    assert_eq!(strip.active_index(), Some(1));
    strip.detach_tab_contents_at(1);
    assert_eq!(strip.active_index(), Some(1));
    strip.detach_tab_contents_at(1);
    assert_eq!(strip.active_index(), Some(0));
    while strip.count() > 1 {
        strip.detach_tab_contents_at(strip.count() - 1);
    }

    // With an opener the next sibling is preferred, then the previous one.
    insert_background_links(&mut strip, &["1", "2", "3"]);
    strip.activate_tab_at(2, false);
    assert_eq!(strip.active_index(), Some(2));
    strip.close_tab_contents_at(2, CloseTabFlags::empty());
    assert_eq!(strip.active_index(), Some(2));
    strip.close_tab_contents_at(2, CloseTabFlags::empty());
    assert_eq!(strip.active_index(), Some(1));
    strip.close_tab_contents_at(1, CloseTabFlags::empty());
    assert_eq!(strip.active_index(), Some(0));

    // A tab with no siblings returns to its opener.
    strip.insert_tab_contents_at(1, page("other"), AddTabFlags::empty());
    assert_eq!(strip.count(), 2);
    strip.insert_tab_contents_at(
        2,
        page("opened"),
        AddTabFlags::ACTIVE | AddTabFlags::INHERIT_GROUP,
    );
    assert_eq!(strip.active_index(), Some(2));
    strip.close_tab_contents_at(2, CloseTabFlags::empty());
    assert_eq!(strip.active_index(), Some(0));
}

/// Home page plus a typed page, with the home page reselected.
fn home_and_typed() -> TabStripModel<PageInfo> {
    let mut strip = strip();
    add(&mut strip, "home", PageTransition::AutoBookmark, AddTabFlags::ACTIVE);
    add(&mut strip, "typed", PageTransition::Typed, AddTabFlags::ACTIVE);
    assert_eq!(strip.count(), 2);
    strip.activate_tab_at(0, true);
    strip
}

#[test]
fn test_middle_click_links_and_close() {
    let mut strip = home_and_typed();
    for name in ["mc1", "mc2", "mc3"] {
        add(&mut strip, name, PageTransition::Link, AddTabFlags::empty());
    }
    assert_eq!(titles(&strip), "home mc1 mc2 mc3 typed");

    // Closing from the middle of the group walks right, wraps to the first
    // sibling, and only then returns to the opener.
    strip.activate_tab_at(2, true);
    strip.close_selected_tabs();
    assert_eq!(active_title(&strip), "mc3");
    strip.close_selected_tabs();
    assert_eq!(active_title(&strip), "mc1");
    strip.close_selected_tabs();
    assert_eq!(active_title(&strip), "home");
    strip.close_selected_tabs();
    assert_eq!(active_title(&strip), "typed");
    assert_eq!(strip.count(), 1);
}

#[test]
fn test_left_click_popup_opens_next_to_opener() {
    let mut strip = home_and_typed();
    add(&mut strip, "popup", PageTransition::Link, AddTabFlags::ACTIVE);

    assert_eq!(titles(&strip), "home popup typed");
    assert_eq!(active_title(&strip), "popup");

    strip.close_selected_tabs();
    assert_eq!(active_title(&strip), "home");
    assert_eq!(strip.count(), 2);
}

#[test]
fn test_new_blank_tabs_open_at_end() {
    let mut strip = home_and_typed();
    add(&mut strip, "blank", PageTransition::Typed, AddTabFlags::ACTIVE);
    assert_eq!(titles(&strip), "home typed blank");

    add(&mut strip, "bg1", PageTransition::Typed, AddTabFlags::empty());
    add(&mut strip, "bg2", PageTransition::Generated, AddTabFlags::empty());
    assert_eq!(titles(&strip), "home typed blank bg1 bg2");
}

#[test]
fn test_switching_context_forgets_openers() {
    let mut strip = home_and_typed();
    for name in ["mc1", "mc2", "mc3"] {
        add(&mut strip, name, PageTransition::Link, AddTabFlags::empty());
    }

    // Leave the group, then step back into it.
    assert_eq!(title_at(&strip, 4), "typed");
    strip.select_last_tab();
    assert_eq!(active_title(&strip), "typed");
    strip.activate_tab_at(2, true);
    assert_eq!(active_title(&strip), "mc2");

    // The context is gone: closing walks right, then left.
    strip.close_selected_tabs();
    assert_eq!(active_title(&strip), "mc3");
    strip.close_selected_tabs();
    assert_eq!(active_title(&strip), "typed");
    strip.close_selected_tabs();
    assert_eq!(active_title(&strip), "mc1");
    strip.close_selected_tabs();
    assert_eq!(active_title(&strip), "home");
    assert_eq!(strip.count(), 1);
}

#[test]
fn test_append_reselects_opener_on_close() {
    let mut strip = strip();
    add(&mut strip, "home", PageTransition::AutoBookmark, AddTabFlags::ACTIVE);
    add(&mut strip, "typed", PageTransition::Typed, AddTabFlags::empty());
    assert_eq!(strip.active_index(), Some(0));

    // A target=_blank link appends in the foreground.
    strip.append_tab_contents(page("blank"), true);
    assert_eq!(strip.active_index(), Some(2));
    strip.close_tab_contents_at(2, CloseTabFlags::empty());
    assert_eq!(strip.active_index(), Some(0));
}

#[test]
fn test_reselection_considers_children() {
    let mut strip = strip();
    add(&mut strip, "a", PageTransition::AutoBookmark, AddTabFlags::ACTIVE);
    add(&mut strip, "aa", PageTransition::Link, AddTabFlags::empty());
    add(&mut strip, "ab", PageTransition::Link, AddTabFlags::empty());

    strip.activate_tab_at(1, true);
    assert_eq!(active_title(&strip), "aa");
    add(&mut strip, "aaa", PageTransition::Link, AddTabFlags::empty());
    assert_eq!(title_at(&strip, 2), "aaa");

    // The child wins over the sibling.
    let active = strip.active_index().unwrap();
    strip.close_tab_contents_at(active, CloseTabFlags::empty());
    assert_eq!(active_title(&strip), "aaa");

    let active = strip.active_index().unwrap();
    strip.close_tab_contents_at(active, CloseTabFlags::empty());
    assert_eq!(active_title(&strip), "ab");

    let active = strip.active_index().unwrap();
    strip.close_tab_contents_at(active, CloseTabFlags::empty());
    assert_eq!(active_title(&strip), "a");
}

#[test]
fn test_new_tab_at_end_inherits_group() {
    let mut strip = strip();
    add(&mut strip, "a", PageTransition::StartPage, AddTabFlags::ACTIVE);
    for name in ["b", "c", "d"] {
        add(&mut strip, name, PageTransition::Link, AddTabFlags::empty());
    }
    strip.activate_tab_at(1, true);

    // Ctrl+T, then close: back to b.
    add(&mut strip, "new", PageTransition::Typed, AddTabFlags::ACTIVE);
    assert_eq!(title_at(&strip, 4), "new");
    assert_eq!(strip.active_index(), Some(4));
    strip.close_tab_contents_at(4, CloseTabFlags::empty());
    assert_eq!(strip.active_index(), Some(1));

    // Alt+Enter from the omnibox behaves the same.
    add(&mut strip, "e", PageTransition::Typed, AddTabFlags::ACTIVE);
    assert_eq!(strip.active_index(), Some(4));
    strip.close_tab_contents_at(4, CloseTabFlags::empty());
    assert_eq!(strip.active_index(), Some(1));

    // Opening a bookmark in a new tab keeps no relationship.
    add(&mut strip, "f", PageTransition::AutoBookmark, AddTabFlags::ACTIVE);
    assert_eq!(strip.active_index(), Some(4));
    strip.close_tab_contents_at(4, CloseTabFlags::empty());
    assert_eq!(strip.active_index(), Some(3));
}

#[test]
fn test_navigation_forgets_openers() {
    let mut strip = strip();
    add(&mut strip, "a", PageTransition::StartPage, AddTabFlags::ACTIVE);
    for name in ["b", "c", "d"] {
        add(&mut strip, name, PageTransition::Link, AddTabFlags::empty());
    }
    add(&mut strip, "e", PageTransition::StartPage, AddTabFlags::empty());

    // Link navigations keep d in the group.
    strip.activate_tab_at(3, true);
    let d = strip.id_at(3);
    strip.notify_navigated(d, PageTransition::Link);
    strip.close_tab_contents_at(3, CloseTabFlags::empty());
    assert_eq!(strip.active_index(), Some(2));

    // A bookmark navigation pulls c out of it.
    let c = strip.id_at(2);
    strip.notify_navigated(c, PageTransition::AutoBookmark);
    assert_eq!(strip.group_of(2), None);
    strip.close_tab_contents_at(2, CloseTabFlags::empty());
    assert_eq!(active_title(&strip), "e");
}

#[test]
fn test_navigation_forgetting_keeps_new_tab_relationship() {
    let mut strip = strip();
    add(&mut strip, "a", PageTransition::StartPage, AddTabFlags::ACTIVE);
    for name in ["b", "c", "d"] {
        add(&mut strip, name, PageTransition::Link, AddTabFlags::empty());
    }
    strip.activate_tab_at(2, true);

    // A new tab at the end returns to the tab the user came from.
    add(&mut strip, "new1", PageTransition::Typed, AddTabFlags::ACTIVE);
    strip.close_tab_contents_at(strip.count() - 1, CloseTabFlags::empty());
    assert_eq!(active_title(&strip), "c");

    // Selecting any other tab drops that relationship.
    add(&mut strip, "new2", PageTransition::Typed, AddTabFlags::ACTIVE);
    strip.activate_tab_at(0, true);
    strip.activate_tab_at(strip.count() - 1, true);
    strip.close_tab_contents_at(strip.count() - 1, CloseTabFlags::empty());
    assert_eq!(active_title(&strip), "d");
}

#[test]
fn test_first_navigation_out_of_new_tab_page_keeps_group() {
    let mut strip = strip();
    add(&mut strip, "a", PageTransition::StartPage, AddTabFlags::ACTIVE);
    strip.add_tab_contents(
        page_at("ntp", "about:newtab"),
        None,
        PageTransition::Typed,
        AddTabFlags::ACTIVE,
    );
    let ntp = strip.id_at(1);
    let a = strip.id_at(0);
    assert_eq!(strip.group_of(1), Some(a));

    // Typing a URL into the new tab page is still the same task.
    strip.notify_navigated(ntp, PageTransition::Typed);
    assert_eq!(strip.group_of(1), Some(a));

    // Once it has history of its own, typing starts a new task.
    if let Some(contents) = strip.contents_mut(ntp) {
        contents.navigate(url::Url::parse("https://typed.example/").unwrap());
    }
    strip.notify_navigated(ntp, PageTransition::Typed);
    assert_eq!(strip.group_of(1), None);
    assert_eq!(strip.opener_of(1), None);
}

#[test]
fn test_configured_new_tab_page_is_recognised() {
    let config =
        TabStripConfig::from_json_str(r#"{ "new_tab_url": "https://start.example/" }"#).unwrap();
    let mut strip = TabStripModel::with_config(Box::new(DefaultDelegate), &config);
    assert_eq!(strip.config().new_tab_url.as_str(), "https://start.example/");
    add(&mut strip, "a", PageTransition::StartPage, AddTabFlags::ACTIVE);
    strip.add_tab_contents(
        page_at("start", "https://start.example/?src=menu"),
        None,
        PageTransition::Typed,
        AddTabFlags::ACTIVE,
    );
    let a = strip.id_at(0);
    let start = strip.id_at(1);

    strip.notify_navigated(start, PageTransition::Typed);
    assert_eq!(strip.group_of(1), Some(a));

    // The stock new tab page is an ordinary page under this config.
    strip.add_tab_contents(
        page_at("ntp", "about:newtab"),
        None,
        PageTransition::Typed,
        AddTabFlags::ACTIVE,
    );
    let ntp = strip.id_at(2);
    assert_eq!(strip.group_of(2), Some(start));
    strip.notify_navigated(ntp, PageTransition::Typed);
    assert_eq!(strip.group_of(2), None);
    assert_eq!(strip.opener_of(2), None);
}

#[test]
fn test_replace_drops_references_to_old_id() {
    let mut strip = strip();
    strip.append_tab_contents(page("opener"), true);
    insert_background_links(&mut strip, &["1", "2"]);
    let opener = strip.id_at(0);

    let old = strip.replace_tab_contents_at(0, page("replacement"));
    assert_eq!(old.display_title(), "opener");
    assert_ne!(strip.id_at(0), opener);
    assert_eq!(strip.opener_of(1), None);
    assert_eq!(strip.group_of(2), None);
    assert_eq!(strip.index_of(opener), None);
}
