use super::{field_view::FieldView, score_badge::ScoreBadge};
use crate::state::{GameSession, SessionAction};
use yew::prelude::*;

#[function_component(App)]
pub fn app() -> Html {
    let session = use_reducer(GameSession::default);

    let toggle = {
        let session = session.clone();
        Callback::from(move |_| session.dispatch(SessionAction::Toggle))
    };

    html! {
        <div id="root" style="position:relative; width:100vw; height:100vh; overflow:hidden; background:#0a0f1e; color:#c9d1d9; font-family:ui-monospace,monospace;">
            <FieldView session={session.clone()} />
            <div id="side-panel" style="position:absolute; top:0; left:0; bottom:0; width:280px; box-sizing:border-box; padding:24px; background:rgba(13,17,23,0.92); border-right:1px solid #30363d; display:flex; flex-direction:column; gap:12px;">
                <h1 style="margin:0; font-size:18px;">{"ambient field"}</h1>
                <p style="margin:0; font-size:12px; opacity:0.7;">
                    {"Particles drift behind this page. Press an arrow key to chase them."}
                </p>
                <button onclick={toggle} style="align-self:flex-start;">
                    { if session.enabled { "Disable minigame" } else { "Enable minigame" } }
                </button>
                <ScoreBadge score={session.score} enabled={session.enabled} />
            </div>
        </div>
    }
}
