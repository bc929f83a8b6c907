//! The assembled hierarchy view of the base overlay.

use ovl_conformance::base_session;
use ovl_views::HierarchyRecord;
use std::rc::Rc;

fn assert_not_empty(record: &HierarchyRecord) {
    assert!(
        !record.ip.is_empty() || !record.memories.is_empty() || !record.hierarchies.is_empty(),
        "empty hierarchy `{}` survived pruning",
        record.fullpath
    );
    for child in record.hierarchies.values() {
        assert_not_empty(child);
    }
}

#[test]
fn pruned_tree_has_no_empty_hierarchy() {
    let mut session = base_session(false);
    let view = session.hierarchy_view().unwrap();
    assert!(!view.contains_key("unused"));
    for (_, record) in view.iter() {
        assert_not_empty(record);
    }
}

#[test]
fn every_nested_hierarchy_is_promoted_to_the_root() {
    let mut session = base_session(false);
    let view = session.hierarchy_view().unwrap();

    fn check(view: &ovl_views::HierarchyView, record: &Rc<HierarchyRecord>) {
        let flat = view.get(&record.fullpath).unwrap();
        assert!(Rc::ptr_eq(flat, record));
        for child in record.hierarchies.values() {
            check(view, child);
        }
    }
    for key in ["audio", "video"] {
        check(&view, view.get(key).unwrap());
    }
    assert_eq!(
        view.keys().collect::<Vec<_>>(),
        vec!["audio", "video", "video/frames"]
    );
}

#[test]
fn hierarchy_drivers_follow_candidates() {
    let mut session = base_session(false);
    let view = session.hierarchy_view().unwrap();
    assert_eq!(view.get("video").unwrap().driver.as_str(), "DmaHierarchy");
    assert_eq!(view.get("audio").unwrap().driver.as_str(), "AudioHierarchy");
    let frames = view.get("video/frames").unwrap();
    assert_eq!(frames.driver.as_str(), "DefaultHierarchy");
    assert_eq!(frames.overlay.as_str(), "base");
    assert_eq!(frames.device.as_str(), "pynq-z2");
}

#[test]
fn records_share_ip_and_memory_entries() {
    let mut session = base_session(false);
    let view = session.hierarchy_view().unwrap();
    let video = view.get("video").unwrap();
    let dma = &video.ip["axi_dma_0"];
    assert_eq!(dma.fullpath, "video/axi_dma_0");
    let bram = &view.get("video/frames").unwrap().memories["axi_bram_ctrl_0"];
    assert_eq!(bram.kind, "memory");
    assert!(bram.image.is_some());
}

#[test]
fn repeated_views_are_identical() {
    let mut session = base_session(false);
    let first = session.hierarchy_view().unwrap().to_json().unwrap();
    let second = session.hierarchy_view().unwrap().to_json().unwrap();
    assert_eq!(first, second);
    assert_eq!(session.memory_cache().build_count(), 1);
}

#[test]
fn driver_lookup_by_name() {
    let mut session = base_session(false);
    assert_eq!(session.driver_for("btns_gpio").unwrap().driver.as_str(), "AxiGPIO");
    assert_eq!(session.driver_for("video").unwrap().driver.as_str(), "DmaHierarchy");
    assert!(session.driver_for("unused").is_err());
}
