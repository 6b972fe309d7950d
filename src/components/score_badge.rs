use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ScoreBadgeProps {
    pub score: u32,
    pub enabled: bool,
}

/// Score readout for the side panel. Hidden while the minigame is disabled.
#[function_component(ScoreBadge)]
pub fn score_badge(props: &ScoreBadgeProps) -> Html {
    if !props.enabled {
        return html! {};
    }
    html! {
        <div style="display:flex; align-items:center; gap:8px; font-size:13px;">
            <span style="display:inline-block; width:10px; height:10px; background:#64ffda; border-radius:2px;"></span>
            <span>{ format!("Score: {}", props.score) }</span>
        </div>
    }
}
