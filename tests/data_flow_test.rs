//! Dataset -> snapshot -> derived view -> layout, across module boundaries

use std::collections::HashSet;

use chainaudit::domain::{
    aggregate, is_link_active, is_node_active, text_filter, wallet_filter, DerivedView,
    GraphLayout, LayoutConfig, Node, NodeType, Point, Transaction,
};
use chainaudit::infrastructure::api::{decode_alerts, decode_prices};
use chainaudit::store::{sample_dataset, Dataset, Snapshot};

const NOW: i64 = 1_700_000_000;

fn sample_snapshot() -> Snapshot {
    Snapshot::build(1, sample_dataset(NOW)).unwrap()
}

#[test]
fn test_sample_dataset_is_consistent() {
    let snapshot = sample_snapshot();
    assert!(snapshot.integrity().is_clean());
    assert_eq!(snapshot.nodes().len(), 8);
    assert_eq!(snapshot.transactions().len(), 10);

    let ids: HashSet<&str> = snapshot.nodes().iter().map(|n| n.id.as_str()).collect();
    for tx in snapshot.transactions() {
        assert!(ids.contains(tx.source.as_str()), "{}", tx.id);
        assert!(ids.contains(tx.target.as_str()), "{}", tx.id);
        assert!(tx.amount >= 0.0);
        assert!(tx.timestamp <= NOW);
    }
}

#[test]
fn test_filters_are_subsets_in_order() {
    let snapshot = sample_snapshot();
    let txs = snapshot.transactions();
    for query in ["", "tx_00", "0X4D", "zzz"] {
        for wallet in [None, Some("0x4d5e6f"), Some("0x445566")] {
            let text = text_filter(txs, query);
            let both = wallet_filter(text.iter().copied(), wallet);
            assert!(text.len() <= txs.len());
            assert!(both.len() <= text.len());

            // order preserved: ids strictly increasing in the sample
            let ids: Vec<&str> = both.iter().map(|tx| tx.id.as_str()).collect();
            let mut sorted = ids.clone();
            sorted.sort();
            assert_eq!(ids, sorted);

            // filtering twice changes nothing
            assert_eq!(text_filter(text.iter().copied(), query), text);
            assert_eq!(wallet_filter(both.iter().copied(), wallet), both);

            // kept rows touch the wallet, dropped rows do not
            let kept: HashSet<&str> = both.iter().map(|tx| tx.id.as_str()).collect();
            for tx in &text {
                let touches = wallet.map_or(true, |w| tx.source == w || tx.target == w);
                assert_eq!(kept.contains(tx.id.as_str()), touches, "{} / {:?}", tx.id, wallet);
            }

            let view = DerivedView::derive(txs, query, wallet);
            assert_eq!(view.wallet_indices.len(), both.len());
            assert_eq!(view.stats, aggregate(both.iter().copied()));

            let volume: f64 = view.wallet_filtered(txs).map(|tx| tx.amount).sum();
            assert!((volume - view.stats.total_volume).abs() < 1e-9);
            assert_eq!(view.wallet_filtered(txs).count(), view.stats.total_transactions);
        }
    }
}

#[test]
fn test_sample_stats() {
    let snapshot = sample_snapshot();
    let view = DerivedView::derive(snapshot.transactions(), "", None);
    assert_eq!(view.stats.total_transactions, 10);
    assert_eq!(view.stats.flagged_count, 3);
    assert!((view.stats.total_volume - 841.3).abs() < 1e-9);
    assert!((view.stats.avg_transaction - 84.13).abs() < 1e-9);

    let whale = DerivedView::derive(snapshot.transactions(), "", Some("0x4d5e6f"));
    let ids: Vec<&str> = whale
        .wallet_filtered(snapshot.transactions())
        .map(|tx| tx.id.as_str())
        .collect();
    assert_eq!(ids, vec!["tx_001", "tx_002", "tx_007", "tx_008"]);
    assert_eq!(whale.stats.flagged_count, 2);
}

#[test]
fn test_layout_places_every_node_on_the_circle() {
    let snapshot = sample_snapshot();
    let config = LayoutConfig::default();
    let layout = GraphLayout::new(config, snapshot.nodes());
    let center = config.center();
    let mut seen: Vec<Point> = Vec::new();
    for (_, pos) in layout.positions() {
        assert!((pos.distance(center) - config.radius).abs() < 1e-9);
        assert!(seen.iter().all(|p| p.distance(pos) > 1.0));
        seen.push(pos);
    }

    // same inputs, same positions
    let again = GraphLayout::new(config, snapshot.nodes());
    for i in 0..layout.len() {
        assert_eq!(layout.position(i), again.position(i));
    }
}

#[test]
fn test_links_resolve_and_highlight() {
    let snapshot = sample_snapshot();
    let layout = GraphLayout::new(LayoutConfig::default(), snapshot.nodes());
    let links = layout.resolve_links(snapshot.transactions());
    assert_eq!(links.links.len(), 10);
    assert!(links.invalid.is_empty());

    let wallet = Some("0x112233");
    let active: Vec<&str> = links
        .links
        .iter()
        .filter(|link| is_link_active(link, wallet))
        .map(|link| link.transaction.id.as_str())
        .collect();
    assert_eq!(active, vec!["tx_007", "tx_009"]);

    let highlighted: Vec<&str> = snapshot
        .nodes()
        .iter()
        .filter(|node| is_node_active(node, wallet))
        .map(|node| node.id.as_str())
        .collect();
    assert_eq!(highlighted, vec!["0x112233"]);
    assert!(links.links.iter().all(|link| !is_link_active(link, None)));

    let heavier = links
        .links
        .iter()
        .find(|link| link.transaction.id == "tx_007")
        .unwrap();
    let lighter = links
        .links
        .iter()
        .find(|link| link.transaction.id == "tx_005")
        .unwrap();
    assert!(heavier.weight > lighter.weight);
}

#[test]
fn test_dangling_links_are_reported_not_drawn() {
    let nodes = vec![
        Node::new("A", "a", NodeType::Wallet),
        Node::new("B", "b", NodeType::Wallet),
    ];
    let txs = vec![
        Transaction::new("ok", "A", "B", 1.0, 0),
        Transaction::new("gone", "A", "Q", 1.0, 0),
    ];
    let layout = GraphLayout::new(LayoutConfig::default(), &nodes);
    let links = layout.resolve_links(&txs);
    assert_eq!(links.links.len(), 1);
    assert_eq!(links.invalid, vec!["gone"]);
}

#[test]
fn test_remote_payload_shapes_decode() {
    let dataset: Dataset = serde_json::from_value(serde_json::json!({
        "nodes": [
            {"id": "0x1", "name": "One", "type": "exchange", "isCritical": true, "region": "EU"},
            {"id": "0x2", "name": "Two", "type": "mixer"}
        ],
        "transactions": [
            {
                "id": "t",
                "source": "0x1",
                "target": "0x2",
                "amount": 3.5,
                "timestamp": 1700000000.5,
                "isFlagged": true
            }
        ]
    }))
    .unwrap();
    let snapshot = Snapshot::build(1, dataset).unwrap();
    assert_eq!(snapshot.node("0x2").map(|n| n.kind), Some(NodeType::Unknown));
    assert_eq!(snapshot.transactions()[0].timestamp, 1_700_000_000);

    let alerts = decode_alerts(serde_json::json!([
        {"id": "a", "type": "rapid_transactions", "severity": "high", "title": "t", "timestamp": 1},
        {"id": "b", "severity": "extreme"}
    ]));
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind_label(), "rapid transactions");

    let prices = decode_prices(serde_json::json!({
        "ETH": {"price": 2650.0, "change_24h": 2.5, "volume_24h": 1.0e9, "market_cap": 3.2e11},
        "BAD": "nope"
    }));
    assert_eq!(prices.keys().collect::<Vec<_>>(), vec!["ETH"]);
}
